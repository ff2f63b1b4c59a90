// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

use crate::core::activity::ActivityMonitor;

/// Raised at most once per idle episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    pub idle_for: Duration,
}

/// Turns the idle clock into a discrete timeout signal.
///
/// The scheduler does not own a timer; the guard's ticker calls `check` once
/// per tick interval.
#[derive(Debug)]
pub struct IdleScheduler {
    idle_timeout: Duration,

    // Activity stamp the current episode started from.
    episode_base_ms: u64,

    // Latched once Timeout is emitted; cleared when a newer reset is seen.
    signaled: bool,
}

impl IdleScheduler {
    pub fn new(idle_timeout: Duration, monitor: &ActivityMonitor) -> Self {
        Self {
            idle_timeout,
            episode_base_ms: monitor.last_activity_ms(),
            signaled: false,
        }
    }

    pub fn check(&mut self, monitor: &ActivityMonitor) -> Option<Timeout> {
        let base = monitor.last_activity_ms();
        if base > self.episode_base_ms {
            self.episode_base_ms = base;
            self.signaled = false;
        }

        if self.signaled {
            return None;
        }

        let idle_for = monitor.elapsed_idle();
        if idle_for < self.idle_timeout {
            return None;
        }

        self.signaled = true;
        Some(Timeout { idle_for })
    }

    #[cfg(test)]
    pub fn signaled(&self) -> bool {
        self.signaled
    }

    /// Time left in the current episode before a timeout would fire.
    pub fn remaining(&self, monitor: &ActivityMonitor) -> Option<Duration> {
        if self.signaled && monitor.last_activity_ms() <= self.episode_base_ms {
            return None;
        }
        Some(self.idle_timeout.saturating_sub(monitor.elapsed_idle()))
    }
}
