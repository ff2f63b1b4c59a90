// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;

use crate::core::state::{LockState, LockStatus};

/// Snapshot returned from the guard for `idlelock info`.
///
/// - `lock` is the stable JSON contract for presentation layers.
/// - `pretty_text` is CLI-facing output.
#[derive(Debug, Clone, Serialize)]
pub struct InfoSnapshot {
    pub user: Option<String>,
    pub route: String,
    pub public_route: bool,
    pub lock: LockState,

    /// Milliseconds until the next idle lock, when one can still fire.
    pub lock_in_ms: Option<u64>,

    /// Milliseconds since the session locked.
    pub locked_for_ms: Option<u64>,
    pub idle_ms: u64,

    #[serde(skip_serializing)]
    pub pretty_text: String,
}

impl InfoSnapshot {
    pub fn render_pretty(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Session:   {}\n", self.user.as_deref().unwrap_or("<none>")));
        out.push_str(&format!(
            "Route:     {}{}\n",
            self.route,
            if self.public_route { " (public)" } else { "" }
        ));
        out.push_str(&format!("Status:    {}\n", self.lock.status));

        if self.lock.status == LockStatus::Locked {
            out.push_str(&format!("Attempts:  {} remaining\n", self.lock.attempts_remaining));
        }
        if let Some(ms) = self.locked_for_ms {
            out.push_str(&format!(
                "Locked:    {} ago\n",
                super::utils::format_duration(std::time::Duration::from_millis(ms))
            ));
        }
        if let Some(err) = &self.lock.last_error {
            out.push_str(&format!("Message:   {err}\n"));
        }

        out.push_str(&format!(
            "Idle for:  {}\n",
            super::utils::format_duration(std::time::Duration::from_millis(self.idle_ms))
        ));
        if let Some(ms) = self.lock_in_ms {
            out.push_str(&format!(
                "Locks in:  {}\n",
                super::utils::format_duration(std::time::Duration::from_millis(ms))
            ));
        }

        out
    }
}
