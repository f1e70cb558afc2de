//! Player actor: turns slot toggles into tokens and claims.

use super::{input::InputSource, models::PlayerHandle};
use crate::{
    dealer::{config::GameConfig, messages::Claim},
    game::{
        constants::{FREEZE_TICK, SET_SIZE},
        entities::{Slot, Verdict},
        table::Table,
    },
    ui::GameUi,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Effect of a single slot toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// An existing token was taken back.
    Removed,
    /// A new token was placed; the claim is not complete yet.
    Placed,
    /// The new token completed a claim.
    Claimed,
    /// Nothing happened: empty slot or no room for another token.
    Ignored,
}

/// Player actor running in its own task
pub struct PlayerActor {
    handle: PlayerHandle,
    table: Arc<Table>,
    claims: mpsc::UnboundedSender<Claim>,
    ui: Arc<dyn GameUi>,
    input: Option<Box<dyn InputSource>>,
    point_freeze: Duration,
    penalty_freeze: Duration,
    cancel: CancellationToken,
}

impl PlayerActor {
    /// Create a new player actor
    ///
    /// # Arguments
    ///
    /// * `handle` - Shared state of this player
    /// * `table` - The shared table
    /// * `claims` - The dealer's claim queue
    /// * `ui` - Display for freeze countdowns
    /// * `config` - Game configuration (freeze durations)
    /// * `input` - Where toggles come from, if the actor should drive one
    /// * `cancel` - Game cancellation token
    pub fn new(
        handle: PlayerHandle,
        table: Arc<Table>,
        claims: mpsc::UnboundedSender<Claim>,
        ui: Arc<dyn GameUi>,
        config: &GameConfig,
        input: Option<Box<dyn InputSource>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            handle,
            table,
            claims,
            ui,
            input,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
            cancel,
        }
    }

    pub fn handle(&self) -> &PlayerHandle {
        &self.handle
    }

    /// Run the player loop until the game is cancelled.
    pub async fn run(mut self) {
        let id = self.handle.id();
        log::info!("player {id} starting");

        let input = self.input.take().map(|source| {
            tokio::spawn(source.feed(self.handle.clone(), self.cancel.clone()))
        });

        loop {
            let slot = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                slot = self.handle.actions().pop() => slot,
            };

            if self.toggle_slot(slot) != Toggle::Claimed {
                continue;
            }
            match self.submit_claim().await {
                Some(verdict) => self.apply_verdict(verdict).await,
                None => break,
            }
        }

        if let Some(task) = input
            && let Err(e) = task.await
        {
            log::error!("player {id}: input task failed: {e}");
        }
        log::info!("player {id} terminated");
    }

    /// Take back the token on `slot`, or place one if there is room.
    ///
    /// Runs as one step under the table lock, so a concurrent removal by
    /// the dealer is seen either entirely before or entirely after.
    pub fn toggle_slot(&self, slot: Slot) -> Toggle {
        let id = self.handle.id();
        let mut table = self.table.lock();
        if table.remove_token(id, slot) {
            return Toggle::Removed;
        }
        if !table.place_token(id, slot) {
            return Toggle::Ignored;
        }
        if table.tokens(id).len() == SET_SIZE {
            Toggle::Claimed
        } else {
            Toggle::Placed
        }
    }

    /// Hand a claim to the dealer and wait for its verdict.
    ///
    /// Returns `None` when the game ends first.
    async fn submit_claim(&self) -> Option<Verdict> {
        let (claim, verdict) = Claim::new(self.handle.id());
        if self.claims.send(claim).is_err() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            verdict = verdict => Some(verdict.unwrap_or(Verdict::Irrelevant)),
        }
    }

    async fn apply_verdict(&self, verdict: Verdict) {
        let id = self.handle.id();
        log::debug!("player {id}: {verdict}");
        match verdict {
            Verdict::Irrelevant => {}
            Verdict::Point => {
                self.freeze(self.point_freeze).await;
                self.handle.clear_actions();
            }
            Verdict::Penalty => {
                self.freeze(self.penalty_freeze).await;
                self.table.lock().clear_tokens(id);
                self.handle.clear_actions();
            }
        }
    }

    /// Block this player for `duration`, counting down on the display.
    async fn freeze(&self, duration: Duration) {
        let id = self.handle.id();
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.ui.set_freeze(id, remaining);
            let step = remaining.min(FREEZE_TICK);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(step) => {}
            }
            remaining -= step;
        }
        self.ui.set_freeze(id, Duration::ZERO);
    }
}
