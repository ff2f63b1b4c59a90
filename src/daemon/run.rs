// Author: Dustin Pilgrim
// License: MIT

use crate::core::{
    error::VerifyError,
    events::Event,
    guard_msg::GuardMsg,
    state::LockStatus,
};
use crate::services::activity::{run_activity_forwarder, ActivitySubscription};

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};

use super::{Guard, GuardExit};

impl Guard {
    /// Runs the guard until logout, session end, stop request or shutdown.
    ///
    /// Every state transition happens on this loop, one message at a time, so
    /// a verification result is always applied before any later tick.
    pub async fn run(
        mut self,
        tx: mpsc::Sender<GuardMsg>,
        mut rx: mpsc::Receiver<GuardMsg>,
        activity: ActivitySubscription,
        mut shutdown: watch::Receiver<bool>,
    ) -> GuardExit {
        tracing::info!("guard starting");

        self.tasks.ticker_handle = Some(tokio::spawn(crate::services::ticker::run_ticker(
            tx.clone(),
            self.cfg.tick_interval,
            self.clock.clone(),
        )));

        self.tasks.activity_handle =
            Some(tokio::spawn(run_activity_forwarder(activity, self.monitor.clone())));

        let exit = loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("guard stopping (shutdown requested)");
                        break GuardExit::Stopped;
                    }
                }

                maybe = rx.recv() => {
                    let Some(msg) = maybe else {
                        tracing::info!("guard stopping (message channel closed)");
                        break GuardExit::Stopped;
                    };

                    if let Some(exit) = self.handle_msg(msg, &tx) {
                        break exit;
                    }

                    if self.controller.status() == LockStatus::ForcedLogout {
                        break GuardExit::LoggedOut;
                    }
                }
            }
        };

        let exit = self.finish_pending_logout(exit, &tx);
        self.teardown();
        exit
    }

    /// Stop and shutdown can arrive inside the grace delay; the forced logout
    /// runs before the guard goes away.
    fn finish_pending_logout(
        &mut self,
        exit: GuardExit,
        tx: &mpsc::Sender<GuardMsg>,
    ) -> GuardExit {
        let actions = self.controller.on_teardown();
        if actions.is_empty() {
            return exit;
        }
        self.exec_actions(actions, tx);
        GuardExit::LoggedOut
    }

    fn handle_msg(&mut self, msg: GuardMsg, tx: &mpsc::Sender<GuardMsg>) -> Option<GuardExit> {
        match msg {
            GuardMsg::Event(Event::Tick { now_ms }) => {
                if !self.store.is_authenticated() {
                    tracing::info!("session no longer authenticated; stopping guard");
                    self.controller.session_ended();
                    return Some(GuardExit::SessionEnded);
                }

                // An in-flight verification finishes before idle is considered again.
                if self.controller.is_verifying() {
                    return None;
                }

                if let Some(timeout) = self.scheduler.check(&self.monitor) {
                    let route = self.store.current_route();
                    tracing::debug!("idle timeout after {:?} on {route}", timeout.idle_for);
                    let actions = self.controller.on_timeout(&route, now_ms);
                    self.exec_actions(actions, tx);
                }
            }

            GuardMsg::Event(ev @ Event::GraceElapsed { .. }) => {
                tracing::debug!("grace delay elapsed at {}ms", ev.now_ms());
                let actions = self.controller.on_grace_elapsed();
                self.exec_actions(actions, tx);
            }

            GuardMsg::SubmitPin { candidate, reply } => {
                if let Err(e) = self.controller.begin_verification(&candidate) {
                    tracing::debug!("pin rejected before verification: {e}");
                    let _ = reply.send(Err(e));
                    return None;
                }

                let fut = self.verifier.verify(candidate);
                let limit = self.cfg.verification_timeout;
                let tx = tx.clone();

                self.tasks.set_verify(tokio::spawn(async move {
                    let guarded = AssertUnwindSafe(fut).catch_unwind();
                    let outcome = match tokio::time::timeout(limit, guarded).await {
                        Ok(Ok(outcome)) => outcome,
                        Ok(Err(_)) => Err(VerifyError::Backend("verifier panicked".to_string())),
                        Err(_) => Err(VerifyError::TimedOut),
                    };
                    let _ = tx.send(GuardMsg::VerificationDone { outcome, reply }).await;
                }));
            }

            GuardMsg::VerificationDone { outcome, reply } => {
                let verdict = self.controller.complete_verification(outcome);
                tracing::debug!(
                    "verification finished: {} of {} attempts used",
                    self.controller.attempts_used(),
                    self.cfg.max_attempts
                );
                self.exec_actions(verdict.actions, tx);
                let _ = reply.send(verdict.result);
            }

            GuardMsg::RequestLogout { reply } => {
                let actions = self.controller.request_logout();
                if actions.is_empty() {
                    let _ = reply.send(Err("already logged out".to_string()));
                } else {
                    self.exec_actions(actions, tx);
                    let _ = reply.send(Ok("Logged out".to_string()));
                }
            }

            GuardMsg::GetInfo { reply } => {
                let _ = reply.send(self.snapshot());
            }

            GuardMsg::SetRoute { route, reply } => {
                let out = self
                    .store
                    .set_route(&route)
                    .map(|_| format!("Route set: {}", route.trim()))
                    .map_err(|e| e.to_string());
                let _ = reply.send(out);
            }

            GuardMsg::Stop { reply } => {
                tracing::info!("guard stopping (stop requested via IPC)");
                let _ = reply.send(Ok("Stopping idlelock".to_string()));
                return Some(GuardExit::Stopped);
            }
        }

        None
    }
}
