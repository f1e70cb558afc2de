//! Dealer actor and game configuration.
//!
//! The dealer owns the deck and is the only task that places or removes
//! cards. Its loop is deal, then run the turn timer while adjudicating
//! claims, then collect the table back into the deck, until no Set is left
//! or the game is cancelled.
//!
//! Claims arrive on an mpsc queue; each carries a oneshot sender for its
//! verdict, so every claimant is woken exactly once.

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{Dealer, winners};
pub use config::GameConfig;
pub use messages::Claim;
