//! Input sources feeding slot toggles to a player.
//!
//! The player task does not care where toggles come from. Each source runs
//! in its own task, pushes into the player's bounded action queue and stops
//! as soon as the game is cancelled.

use super::models::PlayerHandle;
use crate::game::entities::Slot;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Producer of slot toggles for one player.
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Push toggles into `player` until `cancel` fires or the source runs dry.
    async fn feed(self: Box<Self>, player: PlayerHandle, cancel: CancellationToken);
}

/// Synthetic input: presses a uniformly random slot at a fixed cadence.
#[derive(Debug, Clone)]
pub struct RandomInput {
    table_size: usize,
    cadence: Duration,
}

impl RandomInput {
    pub fn new(table_size: usize, cadence: Duration) -> Self {
        Self {
            table_size,
            cadence,
        }
    }
}

#[async_trait]
impl InputSource for RandomInput {
    async fn feed(self: Box<Self>, player: PlayerHandle, cancel: CancellationToken) {
        log::info!("computer-{} starting", player.id());

        while self.table_size > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.cadence) => {}
            }
            let slot = rand::rng().random_range(0..self.table_size);
            player.key_pressed(slot);
        }

        log::info!("computer-{} terminated", player.id());
    }
}

/// Forwards toggles from an external channel, e.g. a keyboard reader.
#[derive(Debug)]
pub struct ChannelInput {
    inbox: mpsc::Receiver<Slot>,
}

impl ChannelInput {
    pub fn new(inbox: mpsc::Receiver<Slot>) -> Self {
        Self { inbox }
    }

    /// Create a source together with the sender that drives it.
    pub fn channel(buffer: usize) -> (mpsc::Sender<Slot>, Self) {
        let (sender, inbox) = mpsc::channel(buffer);
        (sender, Self::new(inbox))
    }
}

#[async_trait]
impl InputSource for ChannelInput {
    async fn feed(self: Box<Self>, player: PlayerHandle, cancel: CancellationToken) {
        let mut inbox = self.inbox;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                slot = inbox.recv() => match slot {
                    Some(slot) => {
                        player.key_pressed(slot);
                    }
                    None => break,
                },
            }
        }
    }
}
