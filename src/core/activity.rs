// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Millisecond clock the guard measures idle time against.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Monotonic clock anchored at guard start.
///
/// Uses tokio's `Instant` so paused-time tests advance it together with timers.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: tokio::time::Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(now_ms: u64) -> Arc<Self> {
        Arc::new(Self { now: AtomicU64::new(now_ms) })
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// The idle clock. Cheap to clone; all clones share one timestamp.
///
/// Every activity source calls `reset()`. The stored value only ever moves
/// forward, so concurrent resets commute and repeated resets collapse into one.
#[derive(Clone)]
pub struct ActivityMonitor {
    clock: Arc<dyn Clock>,
    last_activity_ms: Arc<AtomicU64>,
}

impl ActivityMonitor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            last_activity_ms: Arc::new(AtomicU64::new(now)),
        }
    }

    pub fn reset(&self) {
        self.reset_at(self.clock.now_ms());
    }

    /// Record activity observed at `at_ms`. Older stamps never move the clock back.
    pub fn reset_at(&self, at_ms: u64) {
        self.last_activity_ms.fetch_max(at_ms, Ordering::SeqCst);
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms.load(Ordering::SeqCst)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn elapsed_idle(&self) -> Duration {
        let now = self.clock.now_ms();
        Duration::from_millis(now.saturating_sub(self.last_activity_ms()))
    }
}

impl std::fmt::Debug for ActivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityMonitor")
            .field("last_activity_ms", &self.last_activity_ms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_now_and_measures_idle() {
        let clock = ManualClock::at(1_000);
        let mon = ActivityMonitor::new(clock.clone());

        assert_eq!(mon.last_activity_ms(), 1_000);
        assert_eq!(mon.elapsed_idle(), Duration::ZERO);

        clock.advance(2_500);
        assert_eq!(mon.elapsed_idle(), Duration::from_millis(2_500));
    }

    #[test]
    fn reset_is_idempotent() {
        let clock = ManualClock::at(0);
        let mon = ActivityMonitor::new(clock.clone());

        clock.set(4_000);
        mon.reset();
        let once = mon.last_activity_ms();
        mon.reset();
        mon.reset();

        assert_eq!(mon.last_activity_ms(), once);
        assert_eq!(mon.elapsed_idle(), Duration::ZERO);
    }

    #[test]
    fn resets_commute() {
        let clock = ManualClock::at(0);
        let a = ActivityMonitor::new(clock.clone());
        let b = ActivityMonitor::new(clock);

        a.reset_at(120);
        a.reset_at(100);
        b.reset_at(100);
        b.reset_at(120);

        assert_eq!(a.last_activity_ms(), 120);
        assert_eq!(b.last_activity_ms(), 120);
    }

    #[test]
    fn clones_share_the_clock() {
        let clock = ManualClock::at(0);
        let mon = ActivityMonitor::new(clock.clone());
        let other = mon.clone();

        clock.set(900);
        other.reset();
        assert_eq!(mon.last_activity_ms(), 900);
    }

    #[test]
    fn never_reports_future_activity() {
        let clock = ManualClock::at(500);
        let mon = ActivityMonitor::new(clock);
        // A stamp from a source whose clock runs ahead.
        mon.reset_at(800);
        assert_eq!(mon.elapsed_idle(), Duration::ZERO);
    }

    #[test]
    fn concurrent_resets_keep_the_latest() {
        let clock = ManualClock::at(0);
        let mon = ActivityMonitor::new(clock);

        let handles: Vec<_> = (1..=8u64)
            .map(|i| {
                let mon = mon.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        mon.reset_at(i * 1_000 + j);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(mon.last_activity_ms(), 8_099);
    }
}
