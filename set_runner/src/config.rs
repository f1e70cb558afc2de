//! Runner configuration management.
//!
//! Merges an optional JSON config file, environment variables and CLI
//! flags, in that order of increasing priority, into a validated
//! [`GameConfig`].

use set_game::GameConfig;
use std::path::PathBuf;

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub humans: Option<usize>,
    pub computers: Option<usize>,
    pub timeout_millis: Option<u64>,
    pub config_file: Option<PathBuf>,
    pub json: bool,
}

/// Complete runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Game configuration handed to the core
    pub game: GameConfig,
    /// Stream display events as JSON lines instead of log lines
    pub json: bool,
}

impl RunnerConfig {
    /// Load configuration from the process environment
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI flags, applied last
    ///
    /// # Errors
    ///
    /// Returns error if the config file cannot be read or parsed, or if
    /// the merged configuration does not validate
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::load(overrides, |key| std::env::var(key).ok())
    }

    fn load<F>(overrides: Overrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = overrides
            .config_file
            .clone()
            .or_else(|| env("SET_CONFIG").map(PathBuf::from));
        let base = match file {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::File { path, source })?;
                GameConfig::from_json(&json)?
            }
            None => GameConfig::default(),
        };

        let mut game = GameConfig {
            deck_size: parse_or(&env, "SET_DECK_SIZE", base.deck_size),
            table_size: parse_or(&env, "SET_TABLE_SIZE", base.table_size),
            human_players: parse_or(&env, "SET_HUMANS", base.human_players),
            computer_players: parse_or(&env, "SET_COMPUTERS", base.computer_players),
            turn_timeout_millis: parse_or(&env, "SET_TURN_TIMEOUT_MILLIS", base.turn_timeout_millis),
            point_freeze_millis: parse_or(&env, "SET_POINT_FREEZE_MILLIS", base.point_freeze_millis),
            penalty_freeze_millis: parse_or(
                &env,
                "SET_PENALTY_FREEZE_MILLIS",
                base.penalty_freeze_millis,
            ),
            hints: parse_or(&env, "SET_HINTS", base.hints),
            ..base
        };

        if let Some(humans) = overrides.humans {
            game.human_players = humans;
        }
        if let Some(computers) = overrides.computers {
            game.computer_players = computers;
        }
        if let Some(timeout) = overrides.timeout_millis {
            game.turn_timeout_millis = timeout;
        }
        // A shorter turn shrinks the warning window with it.
        game.turn_timeout_warning_millis = game
            .turn_timeout_warning_millis
            .min(game.turn_timeout_millis);

        let config = RunnerConfig {
            game,
            json: overrides.json || parse_or(&env, "SET_JSON", false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Game(#[from] set_game::ConfigError),
}

/// Helper to parse a variable with default fallback
fn parse_or<F, T>(env: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    env(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
