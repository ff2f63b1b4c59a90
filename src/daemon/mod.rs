// Author: Dustin Pilgrim
// License: MIT

mod actions;
mod run;
mod tasks;


use std::sync::Arc;

use crate::core::{
    activity::{ActivityMonitor, Clock},
    config::GuardConfig,
    controller::SessionLockController,
    info::InfoSnapshot,
    scheduler::IdleScheduler,
    session::SessionStore,
    state::LockStatus,
    verify::PinVerifier,
};

use self::tasks::TaskManager;

/// Why a guard stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardExit {
    /// Forced or voluntary logout went through the guard.
    LoggedOut,
    /// The session store no longer holds an authenticated session.
    SessionEnded,
    /// Stop request or shutdown signal.
    Stopped,
}

/// One running guard: idle clock, scheduler and lock controller for a single
/// authenticated session. Built fresh for every login.
pub struct Guard {
    cfg: Arc<GuardConfig>,
    controller: SessionLockController,
    scheduler: IdleScheduler,
    monitor: ActivityMonitor,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SessionStore>,
    verifier: Arc<dyn PinVerifier>,
    tasks: TaskManager,
}

impl Guard {
    pub fn new(
        cfg: Arc<GuardConfig>,
        store: Arc<dyn SessionStore>,
        verifier: Arc<dyn PinVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let monitor = ActivityMonitor::new(clock.clone());
        let scheduler = IdleScheduler::new(cfg.idle_timeout, &monitor);

        let controller = if store.lock_persisted() {
            tracing::info!("session was locked before restart; resuming lock");
            SessionLockController::resume_locked(cfg.clone(), clock.now_ms())
        } else {
            SessionLockController::new(cfg.clone())
        };

        tracing::debug!(
            "guard: user={:?}, route={}, status={}, cfg={:?}",
            store.current_session().map(|s| s.user),
            store.current_route(),
            controller.status(),
            cfg,
        );

        Self {
            cfg,
            controller,
            scheduler,
            monitor,
            clock,
            store,
            verifier,
            tasks: TaskManager::new(),
        }
    }

    pub fn snapshot(&self) -> InfoSnapshot {
        let route = self.store.current_route();
        let public_route = self.cfg.is_public_route(&route);
        let lock = self.controller.lock_state();

        let lock_in_ms = if lock.status == LockStatus::Unlocked && !public_route {
            self.scheduler
                .remaining(&self.monitor)
                .map(|d| d.as_millis() as u64)
        } else {
            None
        };

        let mut snap = InfoSnapshot {
            user: self.store.current_session().map(|s| s.user),
            route,
            public_route,
            lock,
            lock_in_ms,
            locked_for_ms: self
                .controller
                .locked_at_ms()
                .map(|at| self.monitor.now_ms().saturating_sub(at)),
            idle_ms: self.monitor.elapsed_idle().as_millis() as u64,
            pretty_text: String::new(),
        };
        snap.pretty_text = snap.render_pretty();
        snap
    }

    /// Cancels every timer and task owned by this guard. Nothing scheduled by
    /// the guard can fire after this returns.
    fn teardown(&mut self) {
        self.tasks.abort_all();
        tracing::info!("guard torn down (status: {})", self.controller.status());
    }
}
