//! Table Hints Example
//!
//! Deals a classic twelve-card table and lists the Sets on it.

use set_game::{ClassicRules, Deck, SetOracle};

fn main() {
    println!("=== Set Table Hints Example ===\n");

    let rules = ClassicRules::default();
    let mut deck = Deck::new(81);
    let table: Vec<_> = (0..12).filter_map(|_| deck.draw()).collect();

    println!("Table:");
    for card in &table {
        println!("  {card} features {:?}", rules.features(*card));
    }

    let sets = rules.find_sets(&table, usize::MAX);
    println!("\n{} Set(s) on the table", sets.len());
    for set in &sets {
        println!("  {} {} {}", set[0], set[1], set[2]);
    }

    let remaining: Vec<_> = deck.cards().to_vec();
    println!(
        "\n{} cards left in the deck, Set among them: {}",
        remaining.len(),
        rules.has_set(&remaining)
    );
}
