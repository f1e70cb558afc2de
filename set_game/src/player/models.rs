//! Player state shared between the player task, its input source and the
//! dealer.

use crate::game::{
    constants::MAX_PENDING_ACTIONS,
    entities::{PlayerId, Score, Slot},
};
use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};
use tokio::sync::Notify;

/// Bounded queue of slot toggles waiting for the player task.
///
/// Pushing never blocks: once `capacity` actions are queued further ones
/// are dropped. Any task may clear the queue.
#[derive(Debug)]
pub struct ActionQueue {
    slots: Mutex<VecDeque<Slot>>,
    ready: Notify,
    capacity: usize,
}

impl ActionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Notify::new(),
            capacity,
        }
    }

    /// Queue a toggle. Returns `false` if the queue was full.
    pub fn push(&self, slot: Slot) -> bool {
        {
            let mut slots = self.slots.lock();
            if slots.len() >= self.capacity {
                return false;
            }
            slots.push_back(slot);
        }
        self.ready.notify_one();
        true
    }

    /// Wait for the next toggle.
    pub async fn pop(&self) -> Slot {
        loop {
            if let Some(slot) = self.try_pop() {
                return slot;
            }
            self.ready.notified().await;
        }
    }

    pub fn try_pop(&self) -> Option<Slot> {
        self.slots.lock().pop_front()
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct PlayerShared {
    id: PlayerId,
    human: bool,
    score: AtomicU32,
    actions: ActionQueue,
}

/// Cheap, cloneable handle on a player.
///
/// This is the input surface for a player ([`key_pressed`](Self::key_pressed))
/// and the dealer's view of its score and pending actions.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    inner: Arc<PlayerShared>,
}

impl PlayerHandle {
    pub fn new(id: PlayerId, human: bool) -> Self {
        Self {
            inner: Arc::new(PlayerShared {
                id,
                human,
                score: AtomicU32::new(0),
                actions: ActionQueue::new(MAX_PENDING_ACTIONS),
            }),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.inner.id
    }

    pub fn is_human(&self) -> bool {
        self.inner.human
    }

    pub fn score(&self) -> Score {
        self.inner.score.load(Ordering::Acquire)
    }

    /// Feed a slot toggle to the player. Dropped when the player already
    /// has a full queue.
    pub fn key_pressed(&self, slot: Slot) -> bool {
        let queued = self.inner.actions.push(slot);
        if !queued {
            log::trace!("player {}: dropped toggle of slot {slot}", self.inner.id);
        }
        queued
    }

    pub fn pending_actions(&self) -> usize {
        self.inner.actions.len()
    }

    pub(crate) fn actions(&self) -> &ActionQueue {
        &self.inner.actions
    }

    pub(crate) fn clear_actions(&self) {
        self.inner.actions.clear();
    }

    /// Add one point and return the new score.
    pub(crate) fn award_point(&self) -> Score {
        self.inner.score.fetch_add(1, Ordering::AcqRel) + 1
    }
}
