// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::core::action::Action;
use crate::core::activity::{ActivityMonitor, ManualClock};
use crate::core::config::GuardConfig;
use crate::core::controller::SessionLockController;
use crate::core::error::{PinError, VerifyError};
use crate::core::scheduler::IdleScheduler;
use crate::core::state::{LockStatus, Unlocked};

const ROUTE: &str = "/dashboard";

fn cfg() -> Arc<GuardConfig> {
    let mut cfg = GuardConfig::default();
    cfg.idle_timeout = Duration::from_millis(5_000);
    cfg.max_attempts = 3;
    cfg.pin_length = 4;
    cfg.grace_period = Duration::from_secs(2);
    Arc::new(cfg)
}

fn locked() -> SessionLockController {
    let mut c = SessionLockController::new(cfg());
    c.on_timeout(ROUTE, 0);
    assert_eq!(c.status(), LockStatus::Locked);
    c
}

fn wrong(c: &mut SessionLockController) -> Result<Unlocked, PinError> {
    c.begin_verification("0000").unwrap();
    c.complete_verification(Ok(false)).result
}

#[test]
fn idle_timeout_locks_session() {
    let clock = ManualClock::at(0);
    let mon = ActivityMonitor::new(clock.clone());
    let mut sched = IdleScheduler::new(Duration::from_millis(5_000), &mon);
    let mut ctl = SessionLockController::new(cfg());

    clock.advance(4_000);
    assert!(sched.check(&mon).is_none());
    assert_eq!(ctl.status(), LockStatus::Unlocked);

    clock.advance(1_000);
    let t = sched.check(&mon).expect("timeout after 5000ms idle");
    assert_eq!(t.idle_for, Duration::from_millis(5_000));

    let actions = ctl.on_timeout(ROUTE, mon.now_ms());
    assert_eq!(actions, vec![Action::PersistLock { locked: true }]);
    assert_eq!(ctl.status(), LockStatus::Locked);
    assert_eq!(ctl.locked_at_ms(), Some(5_000));

    let state = ctl.lock_state();
    assert_eq!(state.attempts_remaining, 3);
    assert_eq!(state.last_error, None);
}

#[test]
fn too_short_pin_is_invalid_and_not_counted() {
    let mut c = locked();

    assert_eq!(c.begin_verification("12"), Err(PinError::InvalidFormat));
    assert_eq!(c.attempts_used(), 0);
    assert!(!c.is_verifying());
    assert_eq!(c.lock_state().last_error, None);

    assert_eq!(c.begin_verification("12ab"), Err(PinError::InvalidFormat));
    assert_eq!(c.begin_verification("123456"), Err(PinError::InvalidFormat));
    assert_eq!(c.attempts_used(), 0);
    assert_eq!(c.status(), LockStatus::Locked);
}

#[test]
fn three_wrong_pins_force_logout_after_grace() {
    let mut c = locked();

    assert_eq!(wrong(&mut c), Err(PinError::WrongPin { attempts_remaining: 2 }));
    assert_eq!(
        c.lock_state().last_error.as_deref(),
        Some("Incorrect PIN, 2 attempts remaining")
    );

    assert_eq!(wrong(&mut c), Err(PinError::WrongPin { attempts_remaining: 1 }));
    assert_eq!(c.lock_state().attempts_remaining, 1);

    c.begin_verification("0000").unwrap();
    let verdict = c.complete_verification(Ok(false));
    assert_eq!(verdict.result, Err(PinError::LockedOut));
    assert_eq!(
        verdict.actions,
        vec![Action::ScheduleForcedLogout { after: Duration::from_secs(2) }]
    );

    // Lockout message is visible while the grace timer runs.
    let state = c.lock_state();
    assert_eq!(state.status, LockStatus::Locked);
    assert_eq!(state.attempts_remaining, 0);
    assert!(state.last_error.unwrap().contains("Too many incorrect attempts"));

    let actions = c.on_grace_elapsed();
    assert_eq!(
        actions,
        vec![
            Action::Logout { forced: true },
            Action::NavigateToLogin { route: "/login".to_string() },
        ]
    );
    assert_eq!(c.status(), LockStatus::ForcedLogout);

    // Terminal: a second grace callback does nothing.
    assert!(c.on_grace_elapsed().is_empty());
}

#[test]
fn correct_pin_first_try_unlocks() {
    let mut c = locked();

    c.begin_verification("4821").unwrap();
    let verdict = c.complete_verification(Ok(true));

    assert_eq!(verdict.result, Ok(Unlocked));
    assert_eq!(
        verdict.actions,
        vec![Action::ResetActivity, Action::PersistLock { locked: false }]
    );
    assert_eq!(c.status(), LockStatus::Unlocked);
    assert_eq!(c.attempts_used(), 0);
    assert_eq!(c.lock_state().last_error, None);
}

#[test]
fn public_route_never_locks() {
    let mut c = SessionLockController::new(cfg());

    for i in 0..20 {
        let actions = c.on_timeout("/login", i * 5_000);
        assert_eq!(actions, vec![Action::ResetActivity]);
        assert_eq!(c.status(), LockStatus::Unlocked);
    }

    let mut c = SessionLockController::new(Arc::new(GuardConfig {
        public_route_predicate: Some(Arc::new(|r: &str| r == "/welcome")),
        ..GuardConfig::default()
    }));
    c.on_timeout("/welcome", 1);
    assert_eq!(c.status(), LockStatus::Unlocked);
}

#[test]
fn correct_pin_resets_counter_after_wrong_attempts() {
    let mut c = locked();
    wrong(&mut c).unwrap_err();
    wrong(&mut c).unwrap_err();
    assert_eq!(c.attempts_used(), 2);

    c.begin_verification("4821").unwrap();
    assert_eq!(c.complete_verification(Ok(true)).result, Ok(Unlocked));
    assert_eq!(c.attempts_used(), 0);

    // Next lock starts with the full budget again.
    c.on_timeout(ROUTE, 10_000);
    assert_eq!(c.lock_state().attempts_remaining, 3);
}

#[test]
fn wrong_pin_counts_exactly_one() {
    let mut c = locked();
    for expected in 1..3 {
        let before = c.attempts_used();
        let err = wrong(&mut c).unwrap_err();
        assert!(err.is_counted());
        assert_eq!(c.attempts_used(), before + 1);
        assert_eq!(c.attempts_used(), expected);
    }
}

#[test]
fn verification_outage_is_not_counted() {
    let mut c = locked();

    c.begin_verification("1234").unwrap();
    let verdict = c.complete_verification(Err(VerifyError::TimedOut));

    assert_eq!(verdict.result, Err(PinError::VerificationUnavailable));
    assert!(verdict.actions.is_empty());
    assert_eq!(c.attempts_used(), 0);
    assert_eq!(c.status(), LockStatus::Locked);
    assert!(!PinError::VerificationUnavailable.is_counted());

    // Retry works.
    c.begin_verification("1234").unwrap();
    assert_eq!(c.complete_verification(Ok(true)).result, Ok(Unlocked));
}

#[test]
fn second_submit_while_verifying_is_busy() {
    let mut c = locked();

    c.begin_verification("1111").unwrap();
    assert_eq!(c.begin_verification("2222"), Err(PinError::Busy));
    assert_eq!(c.attempts_used(), 0);

    c.complete_verification(Ok(false));
    assert_eq!(c.attempts_used(), 1);
    assert!(c.begin_verification("2222").is_ok());
}

#[test]
fn submit_while_unlocked_is_rejected() {
    let mut c = SessionLockController::new(cfg());
    assert_eq!(c.begin_verification("1234"), Err(PinError::NotLocked));
}

#[test]
fn submissions_after_lockout_do_not_count() {
    let mut c = locked();
    for _ in 0..3 {
        let _ = wrong(&mut c);
    }
    assert_eq!(c.begin_verification("1234"), Err(PinError::LockedOut));
    assert_eq!(c.attempts_used(), 3);
}

#[test]
fn explicit_logout_skips_grace_and_fires_once() {
    let mut c = locked();
    wrong(&mut c).unwrap_err();

    let actions = c.request_logout();
    assert_eq!(
        actions,
        vec![
            Action::Logout { forced: false },
            Action::NavigateToLogin { route: "/login".to_string() },
        ]
    );
    assert_eq!(c.status(), LockStatus::ForcedLogout);

    assert!(c.request_logout().is_empty());
    assert_eq!(c.begin_verification("1234"), Err(PinError::SessionEnded));
}

#[test]
fn logout_during_grace_wins_over_timer() {
    let mut c = locked();
    for _ in 0..3 {
        let _ = wrong(&mut c);
    }

    let actions = c.request_logout();
    assert_eq!(actions.iter().filter(|a| matches!(a, Action::Logout { .. })).count(), 1);
    assert!(c.on_grace_elapsed().is_empty());
}

#[test]
fn verification_finishing_after_logout_is_discarded() {
    let mut c = locked();
    c.begin_verification("4821").unwrap();
    c.request_logout();

    let verdict = c.complete_verification(Ok(true));
    assert_eq!(verdict.result, Err(PinError::SessionEnded));
    assert!(verdict.actions.is_empty());
    assert_eq!(c.status(), LockStatus::ForcedLogout);
}

#[test]
fn timeout_while_locked_is_ignored() {
    let mut c = locked();
    wrong(&mut c).unwrap_err();

    assert!(c.on_timeout(ROUTE, 99_000).is_empty());
    assert_eq!(c.attempts_used(), 1);
    assert_eq!(c.locked_at_ms(), Some(0));
}

#[test]
fn resumed_guard_starts_locked_with_full_budget() {
    let c = SessionLockController::resume_locked(cfg(), 42);
    let state = c.lock_state();
    assert_eq!(state.status, LockStatus::Locked);
    assert_eq!(state.attempts_remaining, 3);
}

#[test]
fn activity_alone_never_unlocks() {
    let clock = ManualClock::at(0);
    let mon = ActivityMonitor::new(clock.clone());
    let mut sched = IdleScheduler::new(Duration::from_millis(5_000), &mon);
    let mut ctl = SessionLockController::new(cfg());

    clock.advance(5_000);
    let _ = sched.check(&mon).unwrap();
    ctl.on_timeout(ROUTE, mon.now_ms());

    for _ in 0..10 {
        clock.advance(6_000);
        mon.reset();
        clock.advance(6_000);
        if sched.check(&mon).is_some() {
            assert!(ctl.on_timeout(ROUTE, mon.now_ms()).is_empty());
        }
        assert_eq!(ctl.status(), LockStatus::Locked);
    }
}

#[test]
fn teardown_inside_grace_delay_still_logs_out() {
    let mut c = locked();
    assert!(c.on_teardown().is_empty());

    for _ in 0..3 {
        let _ = wrong(&mut c);
    }
    assert_eq!(c.status(), LockStatus::Locked);

    assert_eq!(
        c.on_teardown(),
        vec![
            Action::Logout { forced: true },
            Action::NavigateToLogin { route: "/login".to_string() },
        ]
    );
    assert_eq!(c.status(), LockStatus::ForcedLogout);
    assert!(c.on_grace_elapsed().is_empty());
    assert!(c.on_teardown().is_empty());
}
