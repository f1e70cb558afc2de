//! Player actors.
//!
//! This module implements:
//! - PlayerActor: one task per player, toggling tokens and submitting claims
//! - PlayerHandle: shared score and bounded action queue, also the input entry point
//! - InputSource: pluggable producers of slot toggles (random or channel-fed)
//!
//! ## Lifecycle
//!
//! A player accumulates up to three tokens. The third one submits a claim
//! to the dealer and the player waits for its verdict. A point or a penalty
//! freezes the player for the configured time and drops its queued input;
//! an irrelevant verdict sends it straight back to accumulating.

pub mod actor;
pub mod input;
pub mod models;

pub use actor::{PlayerActor, Toggle};
pub use input::{ChannelInput, InputSource, RandomInput};
pub use models::{ActionQueue, PlayerHandle};
