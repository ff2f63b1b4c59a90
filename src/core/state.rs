// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStatus {
    Unlocked,
    Locked,
    /// Terminal for the guard instance.
    ForcedLogout,
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockStatus::Unlocked => write!(f, "unlocked"),
            LockStatus::Locked => write!(f, "locked"),
            LockStatus::ForcedLogout => write!(f, "logged out"),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockState {
    pub status: LockStatus,
    pub attempts_remaining: u32,
    pub last_error: Option<String>,
}

/// Successful unlock marker returned from `submit_pin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unlocked;
