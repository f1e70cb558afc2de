//! Game configuration.

use crate::{errors::ConfigError, game::constants::SET_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Game configuration, fixed for the whole game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of distinct cards (default: 81)
    pub deck_size: usize,

    /// Number of table slots (default: 12)
    pub table_size: usize,

    /// Features per card for the classic rule (default: 4)
    pub feature_count: u32,

    /// Values per feature for the classic rule (default: 3)
    pub feature_size: u32,

    /// Players fed by an external input stream
    pub human_players: usize,

    /// Players fed by random synthetic input
    pub computer_players: usize,

    /// Time between reshuffles when nobody scores
    pub turn_timeout_millis: u64,

    /// Final stretch of the turn in which the countdown is refreshed
    /// quickly and flagged as urgent
    pub turn_timeout_warning_millis: u64,

    /// Freeze after an accepted claim
    pub point_freeze_millis: u64,

    /// Freeze after a rejected claim
    pub penalty_freeze_millis: u64,

    /// Delay between two synthetic key presses
    pub computer_cadence_millis: u64,

    /// Log the Sets on the table after every deal
    pub hints: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_size: 81,
            table_size: 12,
            feature_count: 4,
            feature_size: 3,
            human_players: 2,
            computer_players: 0,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            computer_cadence_millis: 10,
            hints: false,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_size == 0 {
            return Err(ConfigError::invalid("table_size", "Must be greater than 0"));
        }

        if self.deck_size < SET_SIZE {
            return Err(ConfigError::invalid(
                "deck_size",
                format!("Must hold at least {SET_SIZE} cards"),
            ));
        }

        if self.player_count() == 0 {
            return Err(ConfigError::invalid(
                "human_players",
                "At least one human or computer player is required",
            ));
        }

        if self.turn_timeout_millis == 0 {
            return Err(ConfigError::invalid(
                "turn_timeout_millis",
                "Must be greater than 0",
            ));
        }

        if self.turn_timeout_warning_millis > self.turn_timeout_millis {
            return Err(ConfigError::invalid(
                "turn_timeout_warning_millis",
                format!(
                    "Must not exceed the turn timeout ({}ms)",
                    self.turn_timeout_millis
                ),
            ));
        }

        if self.point_freeze_millis == 0 || self.penalty_freeze_millis == 0 {
            return Err(ConfigError::invalid(
                "point_freeze_millis",
                "Freeze durations must be greater than 0",
            ));
        }

        if self.computer_cadence_millis == 0 {
            return Err(ConfigError::invalid(
                "computer_cadence_millis",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn player_count(&self) -> usize {
        self.human_players + self.computer_players
    }

    /// Players `0..human_players` are human, the rest are computers.
    pub fn is_human(&self, player: usize) -> bool {
        player < self.human_players
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    pub fn computer_cadence(&self) -> Duration {
        Duration::from_millis(self.computer_cadence_millis)
    }
}
