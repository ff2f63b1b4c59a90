// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

/// Side effects requested by the lock controller. The guard runtime decides how
/// to carry them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Restart the idle clock (successful unlock, or a timeout on a public route).
    ResetActivity,

    /// Arm the grace timer; when it elapses the runtime feeds back `GraceElapsed`.
    ScheduleForcedLogout {
        after: Duration,
    },

    /// Call the primary session store's `logout()`. Emitted at most once per guard.
    Logout {
        forced: bool,
    },

    /// Tell the presentation layer to leave for the login surface.
    NavigateToLogin {
        route: String,
    },

    /// Record the lock so a restart resumes it.
    PersistLock {
        locked: bool,
    },
}
