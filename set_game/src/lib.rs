//! # Set Game
//!
//! Coordination core of a real-time Set card game: one dealer and several
//! players share a table of face-up cards. Players mark three cards and
//! claim a Set; the dealer adjudicates claims in arrival order, refills the
//! table, reshuffles when the turn timer runs out and ends the game when no
//! Set is left.
//!
//! ## Architecture
//!
//! Every player and the dealer run as separate Tokio tasks:
//!
//! - **Table**: the only shared state, behind a single lock
//! - **Dealer**: owns the deck and the claim queue, runs the turn timer
//! - **Players**: turn toggles into tokens, submit claims and wait for a
//!   verdict on a oneshot channel
//! - **Input sources**: feed toggles to players (random for computers)
//! - **Display**: receives fire-and-forget [`ui::UiEvent`]s
//!
//! A shared cancellation token ends the game from any suspension point.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, deck, table, matching rule and the [`Game`] facade
//! - [`dealer`]: dealer actor, claims and configuration
//! - [`player`]: player actor, handles and input sources
//! - [`ui`]: display surface
//!
//! ## Example
//!
//! ```no_run
//! use set_game::{Game, GameConfig, ui::LogUi};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GameConfig {
//!         human_players: 0,
//!         computer_players: 4,
//!         ..GameConfig::default()
//!     };
//!     let game = Game::with_classic_rules(config, Arc::new(LogUi)).unwrap();
//!     let outcome = game.run().await.unwrap();
//!     println!("winners: {:?}", outcome.winners);
//! }
//! ```

/// Dealer actor, claim messages and game configuration.
pub mod dealer;
pub use dealer::{Dealer, GameConfig};

/// Error types.
pub mod errors;
pub use errors::{ConfigError, GameError};

/// Cards, table, matching rule and the game facade.
pub mod game;
pub use game::{
    Card, ClassicRules, Deck, Game, GameOutcome, PlayerId, SetOracle, Slot, Table, Verdict,
    constants::{self, SET_SIZE},
};

/// Player actors and input sources.
pub mod player;
pub use player::{ChannelInput, InputSource, PlayerHandle, RandomInput};

/// Display surface.
pub mod ui;
