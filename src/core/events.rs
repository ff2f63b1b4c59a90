// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::str::FromStr;

/// What produced an activity signal. The idle clock treats every kind the same;
/// the kind is only kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Pointer,
    Keyboard,
    Touch,
    Scroll,
    Any,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityKind::Pointer => "pointer",
            ActivityKind::Keyboard => "keyboard",
            ActivityKind::Touch => "touch",
            ActivityKind::Scroll => "scroll",
            ActivityKind::Any => "any",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Ok(ActivityKind::Any),
            "pointer" | "mouse" => Ok(ActivityKind::Pointer),
            "keyboard" | "key" => Ok(ActivityKind::Keyboard),
            "touch" => Ok(ActivityKind::Touch),
            "scroll" => Ok(ActivityKind::Scroll),
            other => Err(format!("unknown activity kind '{other}'")),
        }
    }
}

/// Timer-driven inputs to the guard loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick {
        now_ms: u64,
    },

    /// The forced-logout grace delay ran out.
    GraceElapsed {
        now_ms: u64,
    },
}

impl Event {
    pub fn now_ms(&self) -> u64 {
        match self {
            Event::Tick { now_ms } | Event::GraceElapsed { now_ms } => *now_ms,
        }
    }
}
