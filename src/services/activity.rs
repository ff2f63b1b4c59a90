// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::broadcast;

use crate::core::activity::ActivityMonitor;
use crate::core::events::ActivityKind;

/// A source of "user did something" signals.
pub trait ActivitySource: Send + Sync {
    fn subscribe(&self) -> ActivitySubscription;
}

/// Live subscription. Dropping it (or calling `unsubscribe`) detaches it.
pub struct ActivitySubscription {
    rx: broadcast::Receiver<ActivityKind>,
}

impl ActivitySubscription {
    /// Next signal, or `None` once the source is gone.
    pub async fn recv(&mut self) -> Option<ActivityKind> {
        loop {
            match self.rx.recv().await {
                Ok(kind) => return Some(kind),
                // A burst overflowed the buffer; the next signal is just as good.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// In-process fan-out of activity signals (IPC, input hooks, tests).
#[derive(Debug, Clone)]
pub struct ActivityHub {
    tx: broadcast::Sender<ActivityKind>,
}

impl ActivityHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Returns how many subscribers saw the signal.
    pub fn notify(&self, kind: ActivityKind) -> usize {
        self.tx.send(kind).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ActivityHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivitySource for ActivityHub {
    fn subscribe(&self) -> ActivitySubscription {
        ActivitySubscription { rx: self.tx.subscribe() }
    }
}

/// Feeds every signal into the idle clock until the source closes.
pub async fn run_activity_forwarder(mut sub: ActivitySubscription, monitor: ActivityMonitor) {
    while let Some(kind) = sub.recv().await {
        tracing::trace!("activity: {kind}");
        monitor.reset();
    }
    tracing::debug!("activity source closed");
    sub.unsubscribe();
}
