use std::time::Duration;

/// Number of cards in a claim.
pub const SET_SIZE: usize = 3;

/// Maximum number of toggle events a player keeps queued. Further events
/// are dropped until the player catches up.
pub const MAX_PENDING_ACTIONS: usize = SET_SIZE;

/// Countdown refresh period while the deadline is far away.
pub const COARSE_TICK: Duration = Duration::from_millis(800);

/// Countdown refresh period inside the warning window.
pub const FINE_TICK: Duration = Duration::from_millis(10);

/// Granularity of the freeze countdown shown for a frozen player.
pub const FREEZE_TICK: Duration = Duration::from_millis(1000);
