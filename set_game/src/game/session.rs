//! Game facade: builds the table, players and dealer and runs them.

use super::{
    entities::{PlayerId, Score},
    oracle::{ClassicRules, SetOracle},
    table::Table,
};
use crate::{
    dealer::{Dealer, GameConfig},
    errors::{ConfigError, GameError, Result},
    player::{InputSource, PlayerActor, PlayerHandle, RandomInput},
    ui::GameUi,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Final result of a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// Every player with the top score
    pub winners: Vec<PlayerId>,

    /// Final score of each player, indexed by id
    pub scores: Vec<Score>,
}

/// A game ready to run
///
/// Players `0..human_players` are human and get no input source unless one
/// is set with [`Game::set_input`]; feed them through
/// [`PlayerHandle::key_pressed`]. The remaining players are computers
/// driven by [`RandomInput`].
pub struct Game {
    config: GameConfig,
    table: Arc<Table>,
    players: Vec<PlayerHandle>,
    inputs: Vec<Option<Box<dyn InputSource>>>,
    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn GameUi>,
    cancel: CancellationToken,
}

impl Game {
    /// Create a new game
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] if the configuration does not validate.
    pub fn new(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        ui: Arc<dyn GameUi>,
    ) -> Result<Self> {
        config.validate()?;

        let player_count = config.player_count();
        let table = Arc::new(Table::new(
            config.table_size,
            config.deck_size,
            player_count,
            ui.clone(),
        ));
        let players: Vec<_> = (0..player_count)
            .map(|id| PlayerHandle::new(id, config.is_human(id)))
            .collect();
        let inputs = players
            .iter()
            .map(|player| -> Option<Box<dyn InputSource>> {
                if player.is_human() {
                    None
                } else {
                    Some(Box::new(RandomInput::new(
                        config.table_size,
                        config.computer_cadence(),
                    )))
                }
            })
            .collect();

        Ok(Self {
            config,
            table,
            players,
            inputs,
            oracle,
            ui,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a game judged by [`ClassicRules`] sized from the config.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] if the config does not validate or if
    /// the deck holds more cards than the features can describe.
    pub fn with_classic_rules(config: GameConfig, ui: Arc<dyn GameUi>) -> Result<Self> {
        let rules = ClassicRules::new(config.feature_count, config.feature_size);
        let capacity = rules.deck_capacity();
        if config.deck_size as u64 > capacity {
            return Err(ConfigError::invalid(
                "deck_size",
                format!(
                    "{} features of {} values only describe {capacity} cards",
                    config.feature_count, config.feature_size
                ),
            )
            .into());
        }
        Self::new(config, Arc::new(rules), ui)
    }

    /// Drive `player` from `source` instead of its default input.
    pub fn set_input(&mut self, player: PlayerId, source: Box<dyn InputSource>) -> Result<()> {
        let slot = self
            .inputs
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        *slot = Some(source);
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.players.get(id).cloned()
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    pub fn table(&self) -> Arc<Table> {
        self.table.clone()
    }

    /// Token that ends the game when cancelled. Winners are still announced.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Play the game to the end.
    pub async fn run(self) -> Result<GameOutcome> {
        log::info!(
            "starting game: {} players, {} cards, {} slots",
            self.players.len(),
            self.config.deck_size,
            self.config.table_size
        );

        let (claims, inbox) = mpsc::unbounded_channel();
        let actors: Vec<_> = self
            .players
            .iter()
            .zip(self.inputs)
            .map(|(handle, input)| {
                PlayerActor::new(
                    handle.clone(),
                    self.table.clone(),
                    claims.clone(),
                    self.ui.clone(),
                    &self.config,
                    input,
                    self.cancel.clone(),
                )
            })
            .collect();
        drop(claims);

        let dealer = Dealer::new(
            self.config,
            self.table,
            self.players.clone(),
            inbox,
            self.oracle,
            self.ui,
            self.cancel,
        );
        let winners = tokio::spawn(dealer.run(actors)).await??;

        Ok(GameOutcome {
            winners,
            scores: self.players.iter().map(PlayerHandle::score).collect(),
        })
    }
}
