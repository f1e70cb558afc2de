//! Set-validity and Set-existence checks.
//!
//! The dealer treats the matching rule as an opaque predicate behind
//! [`SetOracle`]. [`ClassicRules`] is the usual rule: every card carries a
//! number of features, and three cards form a Set when each feature is
//! either the same on all three cards or different on all three.

use super::{constants::SET_SIZE, entities::Card};

/// Matching rule used by the dealer to adjudicate claims and to decide
/// whether the game can continue.
///
/// Implementations must be pure: the same cards always give the same
/// answer.
pub trait SetOracle: Send + Sync {
    /// Whether exactly these three cards form a Set.
    fn test_set(&self, cards: &[Card; SET_SIZE]) -> bool;

    /// Collect up to `limit` Sets found among `cards`.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<[Card; SET_SIZE]> {
        let mut found = Vec::new();
        if limit == 0 {
            return found;
        }
        let n = cards.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let triple = [cards[i], cards[j], cards[k]];
                    if self.test_set(&triple) {
                        found.push(triple);
                        if found.len() == limit {
                            return found;
                        }
                    }
                }
            }
        }
        found
    }

    /// Whether at least one Set exists among `cards`.
    fn has_set(&self, cards: &[Card]) -> bool {
        !self.find_sets(cards, 1).is_empty()
    }
}

/// The classic feature-based rule.
///
/// A card id is read as `feature_count` digits in base `feature_size`;
/// digit `i` is the value of feature `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicRules {
    feature_count: u32,
    feature_size: u32,
}

impl ClassicRules {
    pub fn new(feature_count: u32, feature_size: u32) -> Self {
        Self {
            feature_count,
            feature_size,
        }
    }

    /// Number of distinct cards this rule can describe.
    pub fn deck_capacity(&self) -> u64 {
        u64::from(self.feature_size).saturating_pow(self.feature_count)
    }

    /// Decode a card into its feature values.
    pub fn features(&self, card: Card) -> Vec<u32> {
        let mut id = card.id();
        let mut features = Vec::with_capacity(self.feature_count as usize);
        for _ in 0..self.feature_count {
            features.push(id % self.feature_size);
            id /= self.feature_size;
        }
        features
    }
}

impl Default for ClassicRules {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl SetOracle for ClassicRules {
    fn test_set(&self, cards: &[Card; SET_SIZE]) -> bool {
        if cards[0] == cards[1] || cards[1] == cards[2] || cards[0] == cards[2] {
            return false;
        }
        let [a, b, c] = cards.map(|card| self.features(card));
        a.iter().zip(&b).zip(&c).all(|((x, y), z)| {
            let all_same = x == y && y == z;
            let all_different = x != y && y != z && x != z;
            all_same || all_different
        })
    }
}
