// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use eyre::{eyre, Result, WrapErr};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, watch};

use crate::cli::Args;
use crate::core::activity::MonotonicClock;
use crate::core::session::SessionStore;
use crate::daemon::{Guard, GuardExit};
use crate::ipc::router::IpcContext;
use crate::services::activity::{ActivityHub, ActivitySource};
use crate::services::session_store::{default_store_path, FileSessionStore};
use crate::services::verifier::StaticPinVerifier;

/// Slack on top of a full verification for one IPC round trip.

pub async fn run(args: Args) -> Result<()> {
    // single-instance
    let _instance_lock = crate::app::platform::acquire_single_instance_lock().map_err(|e| eyre!(e))?;

    crate::app::platform::init_logging(args.verbose);
    tracing::info!("idlelock starting");

    let cfg = crate::config::load(args.config.as_deref()).map_err(|e| {
        tracing::error!("{e:#}");
        e
    })?;
    let pin = cfg
        .expected_pin()
        .map_err(|e| eyre!("{e} (set guard.pin or {})", crate::config::PIN_ENV))?
        .to_string();
    let cfg = Arc::new(cfg);

    let store = FileSessionStore::open(default_store_path())
        .map_err(|e| eyre!("failed to open session store: {e}"))?;
    let Some(session) = store.current_session() else {
        return Err(eyre!(
            "no active session in {}; run `idlelock login <user>` first",
            store.path().display()
        ));
    };
    tracing::info!("guarding session of {} (since {})", session.user, session.logged_in_at);

    let store: Arc<dyn SessionStore> = Arc::new(store);
    let verifier = Arc::new(StaticPinVerifier::new(pin, cfg.verification_latency));
    let guard = Guard::new(cfg.clone(), store, verifier, Arc::new(MonotonicClock::new()));

    let (tx, rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let hub = ActivityHub::new();

    // ipc
    let socket = crate::ipc::socket_path().map_err(|e| eyre!(e))?;
    if let Some(parent) = socket.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    let _ = std::fs::remove_file(&socket);
    let listener = UnixListener::bind(&socket)
        .wrap_err_with(|| format!("failed to bind IPC socket {}", socket.display()))?;
    let ipc_timeout = cfg.ipc_reply_timeout();
    let ipc_task = crate::ipc::server::spawn_ipc_server(
        listener,
        IpcContext { tx: tx.clone(), hub: hub.clone() },
        ipc_timeout,
    );
    tracing::info!("IPC listening on {}", socket.display());

    let mut guard_task = tokio::spawn(guard.run(tx, rx, hub.subscribe(), shutdown_rx));

    let exit = tokio::select! {
        res = &mut guard_task => res.wrap_err("guard task failed")?,

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
            let _ = shutdown_tx.send(true);
            guard_task.await.wrap_err("guard task failed")?
        }
    };

    ipc_task.abort();
    let _ = std::fs::remove_file(&socket);

    match exit {
        GuardExit::LoggedOut => tracing::info!("session logged out; guard exiting"),
        GuardExit::SessionEnded => tracing::info!("session ended elsewhere; guard exiting"),
        GuardExit::Stopped => tracing::info!("guard stopped"),
    }

    Ok(())
}
