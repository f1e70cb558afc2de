//! Messages exchanged between players and the dealer.

use crate::game::entities::{PlayerId, Verdict};
use tokio::sync::oneshot;

/// A player's claim that its three tokens form a Set.
///
/// The dealer answers every claim it takes off the queue exactly once
/// through `respond`. A dropped `respond` reads as [`Verdict::Irrelevant`].
#[derive(Debug)]
pub struct Claim {
    pub player: PlayerId,
    pub respond: oneshot::Sender<Verdict>,
}

impl Claim {
    /// Create a claim and the receiver its verdict arrives on.
    pub fn new(player: PlayerId) -> (Self, oneshot::Receiver<Verdict>) {
        let (respond, verdict) = oneshot::channel();
        (Self { player, respond }, verdict)
    }

    /// Deliver the verdict. The player may already be gone.
    pub fn answer(self, verdict: Verdict) {
        if self.respond.send(verdict).is_err() {
            log::debug!("player {} left before its {verdict} verdict", self.player);
        }
    }
}
