// Author: Dustin Pilgrim
// License: MIT

use crate::core::{action::Action, events::Event, guard_msg::GuardMsg};

use tokio::sync::mpsc;

use super::Guard;

impl Guard {
    pub(super) fn exec_action_with_tx(&mut self, action: Action, tx: &mpsc::Sender<GuardMsg>) {
        match action {
            Action::ResetActivity => {
                self.monitor.reset();
            }

            Action::ScheduleForcedLogout { after } => {
                tracing::info!("forced logout in {:?}", after);
                let tx = tx.clone();
                let clock = self.clock.clone();
                self.tasks.set_grace(tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let now_ms = clock.now_ms();
                    let _ = tx.send(GuardMsg::Event(Event::GraceElapsed { now_ms })).await;
                }));
            }

            Action::Logout { forced } => {
                self.tasks.cancel_grace();
                tracing::info!("logout: {}", if forced { "forced" } else { "requested" });

                // Status is already ForcedLogout; a store failure is only reported.
                if let Err(e) = self.store.logout() {
                    tracing::error!("session logout failed: {e}");
                }
            }

            Action::NavigateToLogin { route } => {
                tracing::info!("navigate: {route}");
                if let Err(e) = self.store.set_route(&route) {
                    tracing::warn!("could not record login route: {e}");
                }
            }

            Action::PersistLock { locked } => {
                if let Err(e) = self.store.persist_lock(locked) {
                    tracing::warn!("could not persist lock state: {e}");
                }
            }
        }
    }

    pub(super) fn exec_actions(&mut self, actions: Vec<Action>, tx: &mpsc::Sender<GuardMsg>) {
        if !actions.is_empty() {
            tracing::debug!("actions: {:?}", actions);
        }
        for action in actions {
            self.exec_action_with_tx(action, tx);
        }
    }
}
