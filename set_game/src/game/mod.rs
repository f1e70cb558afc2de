//! Game entities and shared state.
//!
//! This module provides the pieces every actor works with:
//! - Cards, slots, the deck and claim verdicts
//! - The shared table guarded by a single lock
//! - The matching rule (oracle) used to adjudicate claims
//! - The `Game` facade that wires a dealer and its players together

pub mod constants;
pub mod entities;
pub mod oracle;
pub mod session;
pub mod table;

pub use entities::{Card, Deck, PlayerId, Score, Slot, Verdict};
pub use oracle::{ClassicRules, SetOracle};
pub use session::{Game, GameOutcome};
pub use table::{Table, TableState};
