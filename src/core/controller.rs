// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use crate::core::{
    action::Action,
    config::GuardConfig,
    error::{PinError, VerifyError},
    state::{LockState, LockStatus, Unlocked},
};

/// Result of applying a finished verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub result: Result<Unlocked, PinError>,
    pub actions: Vec<Action>,
}

/// Lock / unlock / forced-logout state machine for one authenticated session.
///
/// The controller never sleeps or spawns. Timers and the verification call live
/// in the guard runtime, which feeds their outcomes back in and carries out the
/// returned actions.
#[derive(Debug)]
pub struct SessionLockController {
    cfg: Arc<GuardConfig>,

    status: LockStatus,
    attempts_used: u32,
    last_error: Option<String>,

    // A verification is in flight; only one at a time.
    verifying: bool,

    // Attempts exhausted, grace timer armed.
    logout_pending: bool,

    locked_at_ms: Option<u64>,
}

impl SessionLockController {
    pub fn new(cfg: Arc<GuardConfig>) -> Self {
        Self {
            cfg,
            status: LockStatus::Unlocked,
            attempts_used: 0,
            last_error: None,
            verifying: false,
            logout_pending: false,
            locked_at_ms: None,
        }
    }

    /// Rebuild a guard whose session was locked before a restart. The attempt
    /// counter starts fresh.
    pub fn resume_locked(cfg: Arc<GuardConfig>, now_ms: u64) -> Self {
        let mut c = Self::new(cfg);
        c.enter_locked(now_ms);
        c
    }

    pub fn status(&self) -> LockStatus {
        self.status
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn locked_at_ms(&self) -> Option<u64> {
        self.locked_at_ms
    }

    pub fn lock_state(&self) -> LockState {
        LockState {
            status: self.status,
            attempts_remaining: self.attempts_remaining(),
            last_error: self.last_error.clone(),
        }
    }

    fn attempts_remaining(&self) -> u32 {
        self.cfg.max_attempts.saturating_sub(self.attempts_used)
    }

    fn enter_locked(&mut self, now_ms: u64) {
        self.status = LockStatus::Locked;
        self.attempts_used = 0;
        self.last_error = None;
        self.logout_pending = false;
        self.locked_at_ms = Some(now_ms);
    }

    // ---------------- idle ----------------

    /// Idle timeout reported by the scheduler while the session is on `route`.
    pub fn on_timeout(&mut self, route: &str, now_ms: u64) -> Vec<Action> {
        if self.status != LockStatus::Unlocked {
            return Vec::new();
        }

        if self.cfg.is_public_route(route) {
            tracing::debug!("idle timeout on public route {route}; not locking");
            return vec![Action::ResetActivity];
        }

        tracing::info!("idle timeout on {route}; locking session");
        self.enter_locked(now_ms);
        vec![Action::PersistLock { locked: true }]
    }

    // ---------------- pin protocol ----------------

    /// Synchronous half of `submit_pin`: state and format checks. On `Ok` the
    /// caller must run the verifier and hand the outcome to `complete_verification`.
    pub fn begin_verification(&mut self, candidate: &str) -> Result<(), PinError> {
        match self.status {
            LockStatus::ForcedLogout => return Err(PinError::SessionEnded),
            LockStatus::Unlocked => return Err(PinError::NotLocked),
            LockStatus::Locked => {}
        }

        if self.logout_pending {
            return Err(PinError::LockedOut);
        }

        if self.verifying {
            return Err(PinError::Busy);
        }

        if !self.cfg.is_well_formed_pin(candidate) {
            return Err(PinError::InvalidFormat);
        }

        self.verifying = true;
        Ok(())
    }

    /// Asynchronous half of `submit_pin`. `outcome` is `Ok(matched)` or the
    /// verifier's own failure.
    pub fn complete_verification(&mut self, outcome: Result<bool, VerifyError>) -> Verdict {
        self.verifying = false;

        if self.status != LockStatus::Locked || self.logout_pending {
            return Verdict { result: Err(PinError::SessionEnded), actions: Vec::new() };
        }

        match outcome {
            Err(e) => {
                tracing::warn!("pin verification unavailable: {e}");
                self.last_error = Some("PIN check unavailable, please try again".to_string());
                Verdict { result: Err(PinError::VerificationUnavailable), actions: Vec::new() }
            }

            Ok(true) => {
                tracing::info!("session unlocked");
                self.status = LockStatus::Unlocked;
                self.attempts_used = 0;
                self.last_error = None;
                self.locked_at_ms = None;
                Verdict {
                    result: Ok(Unlocked),
                    actions: vec![Action::ResetActivity, Action::PersistLock { locked: false }],
                }
            }

            Ok(false) => {
                self.attempts_used = (self.attempts_used + 1).min(self.cfg.max_attempts);
                let remaining = self.attempts_remaining();

                if self.attempts_used >= self.cfg.max_attempts {
                    tracing::warn!("pin attempts exhausted; forcing logout in {:?}", self.cfg.grace_period);
                    self.last_error = Some("Too many incorrect attempts. Logging out...".to_string());
                    self.logout_pending = true;
                    return Verdict {
                        result: Err(PinError::LockedOut),
                        actions: vec![Action::ScheduleForcedLogout { after: self.cfg.grace_period }],
                    };
                }

                tracing::info!("incorrect pin, {remaining} attempts remaining");
                self.last_error = Some(format!("Incorrect PIN, {remaining} attempts remaining"));
                Verdict {
                    result: Err(PinError::WrongPin { attempts_remaining: remaining }),
                    actions: Vec::new(),
                }
            }
        }
    }

    // ---------------- logout ----------------

    pub fn on_grace_elapsed(&mut self) -> Vec<Action> {
        if self.status != LockStatus::Locked || !self.logout_pending {
            return Vec::new();
        }
        self.enter_forced_logout(true)
    }

    /// User chose to log out instead of unlocking. Skips the grace delay.
    pub fn request_logout(&mut self) -> Vec<Action> {
        if self.status == LockStatus::ForcedLogout {
            return Vec::new();
        }
        tracing::info!("logout requested");
        self.enter_forced_logout(false)
    }

    fn enter_forced_logout(&mut self, forced: bool) -> Vec<Action> {
        self.status = LockStatus::ForcedLogout;
        self.logout_pending = false;
        self.verifying = false;
        self.locked_at_ms = None;

        vec![
            Action::Logout { forced },
            Action::NavigateToLogin { route: self.cfg.login_route.clone() },
        ]
    }

    /// The guard is going away. A forced logout still waiting on its grace
    /// delay is carried out now, so the session never outlives exhausted attempts.
    pub fn on_teardown(&mut self) -> Vec<Action> {
        if self.status != LockStatus::Locked || !self.logout_pending {
            return Vec::new();
        }
        tracing::warn!("guard stopping during grace delay; logging out now");
        self.enter_forced_logout(true)
    }

    /// The session ended outside the guard (store reports unauthenticated).
    pub fn session_ended(&mut self) {
        self.status = LockStatus::ForcedLogout;
        self.logout_pending = false;
        self.verifying = false;
    }
}
