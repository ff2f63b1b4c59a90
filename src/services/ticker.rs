// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tokio::time::{sleep, Duration};

use crate::core::activity::Clock;
use crate::core::events::Event;
use crate::core::guard_msg::GuardMsg;

/// Drives the idle scheduler. Aborted on guard teardown.
pub async fn run_ticker(tx: Sender<GuardMsg>, interval: Duration, clock: Arc<dyn Clock>) {
    tracing::info!("ticker started ({interval:?})");

    loop {
        sleep(interval).await;

        let now_ms = clock.now_ms();
        // If the guard is gone, stop.
        if tx.send(GuardMsg::Event(Event::Tick { now_ms })).await.is_err() {
            tracing::warn!("ticker stopping (receiver dropped)");
            break;
        }
    }
}
