//! Shared helpers for integration tests.

#![allow(dead_code)]

use set_game::{Card, SetOracle, Slot, Table};
use std::time::Duration;

/// Oracle that accepts exactly the listed triples, in any order.
pub struct ListedSets(pub Vec<[u32; 3]>);

impl SetOracle for ListedSets {
    fn test_set(&self, cards: &[Card; 3]) -> bool {
        let mut ids = cards.map(Card::id);
        ids.sort_unstable();
        self.0.iter().any(|set| {
            let mut set = *set;
            set.sort_unstable();
            set == ids
        })
    }
}

/// Wait (in virtual time) until `condition` holds.
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..100_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition never became true");
}

/// Slots currently holding `cards`.
pub fn slots_of(table: &Table, cards: [u32; 3]) -> [Slot; 3] {
    cards.map(|card| {
        table
            .slot_of(Card(card))
            .unwrap_or_else(|| panic!("card {card} not on the table"))
    })
}
