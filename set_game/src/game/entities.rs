use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Table position index. The slot count is fixed for a whole game.
pub type Slot = usize;

/// Player identity, starting from 0.
pub type PlayerId = usize;

/// Score type. Scores only ever grow by one per accepted claim.
pub type Score = u32;

/// A card is an opaque identifier in `[0, deck_size)`.
///
/// The combinatorial meaning of the identifier belongs to the
/// [`SetOracle`](super::oracle::SetOracle) in use.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub u32);

impl Card {
    pub fn id(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02}", self.0)
    }
}

impl From<u32> for Card {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// The ordered pool of cards that are not currently displayed.
///
/// The deck is reshuffled every time cards are returned to it, so draws
/// always come off a freshly randomized order.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Create a shuffled deck holding every card in `[0, size)`.
    pub fn new(size: usize) -> Self {
        let mut deck = Self {
            cards: (0..size as u32).map(Card).collect(),
        };
        deck.shuffle();
        deck
    }

    /// Create a deck with an exact order. No shuffle is applied.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Return cards to the deck and reshuffle.
    pub fn add<I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = Card>,
    {
        self.cards.extend(cards);
        self.shuffle();
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }
}

/// Outcome the dealer assigns to a submitted claim.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Verdict {
    /// The three cards formed a Set. The point is already recorded.
    Point,
    /// The three cards did not form a Set.
    Penalty,
    /// The claim went stale before it was checked (one of its slots was
    /// consumed earlier in the batch, or the table was collected).
    Irrelevant,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Point => "point",
            Self::Penalty => "penalty",
            Self::Irrelevant => "irrelevant",
        };
        write!(f, "{repr}")
    }
}
