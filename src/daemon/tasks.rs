// Author: Dustin Pilgrim
// License: MIT

use tokio::task::JoinHandle;

/// Background work owned by one guard.
#[derive(Debug, Default)]
pub struct TaskManager {
    pub ticker_handle: Option<JoinHandle<()>>,
    pub activity_handle: Option<JoinHandle<()>>,
    pub grace_handle: Option<JoinHandle<()>>,
    pub verify_handle: Option<JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_grace(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.grace_handle.replace(handle) {
            old.abort();
        }
    }

    pub fn cancel_grace(&mut self) {
        if let Some(handle) = self.grace_handle.take() {
            handle.abort();
        }
    }

    pub fn set_verify(&mut self, handle: JoinHandle<()>) {
        // The controller serialises verification, so a previous handle has finished.
        if let Some(old) = self.verify_handle.replace(handle) {
            if !old.is_finished() {
                tracing::warn!("replacing a verification task that is still running");
                old.abort();
            }
        }
    }

    /// Stops the ticker, activity forwarder, grace timer and any in-flight
    /// verification. Safe to call more than once.
    pub fn abort_all(&mut self) {
        if let Some(handle) = self.ticker_handle.take() { handle.abort(); }
        if let Some(handle) = self.activity_handle.take() { handle.abort(); }
        if let Some(handle) = self.grace_handle.take() { handle.abort(); }
        if let Some(handle) = self.verify_handle.take() { handle.abort(); }
    }
}
