// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;
use std::time::Duration;

use eyre::{eyre, Result};

use crate::cli::Command;
use crate::core::config::GuardConfig;
use crate::core::session::{Credentials, SessionStore};
use crate::services::session_store::{default_store_path, FileSessionStore};

pub async fn run(cmd: Command, config: Option<&Path>) -> Result<()> {
    let limit = reply_timeout(config);

    match cmd {
        Command::Login { user } => login(&user),

        Command::Info { json } => {
            let msg = if json { "info --json" } else { "info" };

            match crate::ipc::client::send_raw(msg, limit).await {
                Ok(resp) => {
                    if !resp.is_empty() {
                        println!("{resp}");
                    }
                }
                Err(e) => {
                    if json {
                        // Presentation layers still expect a JSON document.
                        println!(r#"{{"running":false,"error":"{}"}}"#, e.replace('"', "'"));
                    } else {
                        eprintln!("idlelock: {e}");
                    }
                }
            }
            Ok(())
        }

        Command::Activity { kind } => {
            let msg = match kind {
                Some(kind) => format!("activity {kind}"),
                None => "activity".to_string(),
            };
            forward(&msg, "Activity recorded", limit).await
        }

        Command::Unlock { pin, json } => {
            let msg = if json { format!("unlock {pin} --json") } else { format!("unlock {pin}") };
            forward(&msg, "Unlocked", limit).await
        }

        Command::Logout => forward("logout", "Logged out", limit).await,

        Command::Route { path } => forward(&format!("route {path}"), "Route set", limit).await,

        Command::Stop => forward("stop", "Stopping idlelock", limit).await,
    }
}

/// Sends one command and prints the daemon's answer.
async fn forward(msg: &str, fallback: &str, limit: Duration) -> Result<()> {
    match crate::ipc::client::send_raw(msg, limit).await {
        Ok(resp) => {
            let out = resp.trim_end();
            if out.is_empty() {
                println!("{fallback}");
            } else if out.starts_with("ERROR:") {
                eprintln!("{out}");
            } else {
                println!("{out}");
            }
        }
        Err(e) => eprintln!("idlelock: {e}"),
    }
    Ok(())
}

/// Waits as long as the daemon would for a verification. An unreadable
/// config falls back to the defaults; the daemon reports its own config errors.
fn reply_timeout(config: Option<&Path>) -> Duration {
    crate::config::load(config)
        .map(|cfg| cfg.ipc_reply_timeout())
        .unwrap_or_else(|_| GuardConfig::default().ipc_reply_timeout())
}

fn login(user: &str) -> Result<()> {
    let store = FileSessionStore::open(default_store_path())
        .map_err(|e| eyre!("failed to open session store: {e}"))?;

    let session = store
        .login(&Credentials { user: user.trim().to_string() })
        .map_err(|e| eyre!("login failed: {e}"))?;

    println!(
        "Logged in as {} at {}",
        session.user,
        session.logged_in_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("Start the guard with `idlelock` to lock this session when idle.");
    Ok(())
}
