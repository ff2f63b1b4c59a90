// Author: Dustin Pilgrim
// License: MIT

use serde_json::json;
use tokio::sync::{mpsc, oneshot};

use crate::core::{error::PinError, events::ActivityKind, guard_msg::GuardMsg};
use crate::services::activity::ActivityHub;

const NOT_RUNNING: &str = "ERROR: guard is not running";

/// Handles shared by every IPC connection.
#[derive(Debug, Clone)]
pub struct IpcContext {
    pub tx: mpsc::Sender<GuardMsg>,
    pub hub: ActivityHub,
}

/// Routes one plain-text command to the guard and renders the reply.
pub async fn route_command(cmd: &str, ctx: &IpcContext) -> String {
    let cmd = cmd.trim();
    let (verb, rest) = match cmd.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (cmd, ""),
    };

    let result: Result<String, String> = match verb {
        "info" => handle_info(ctx, rest.split_whitespace().any(|a| a == "--json")).await,
        "activity" => handle_activity(ctx, rest),
        "unlock" => handle_unlock(ctx, rest).await,
        "logout" => {
            ask(ctx, |reply| GuardMsg::RequestLogout { reply })
                .await
                .and_then(|r| r.map_err(|e| format!("ERROR: {e}")))
        }
        "route" => {
            if rest.is_empty() {
                Err("ERROR: route requires a path".to_string())
            } else {
                let route = rest.to_string();
                ask(ctx, |reply| GuardMsg::SetRoute { route, reply })
                    .await
                    .and_then(|r| r.map_err(|e| format!("ERROR: {e}")))
            }
        }
        "stop" => ask(ctx, |reply| GuardMsg::Stop { reply })
            .await
            .and_then(|r| r.map_err(|e| format!("ERROR: {e}"))),
        _ => {
            tracing::warn!("unknown IPC command: {cmd}");
            Err(format!("ERROR: Unknown command '{cmd}'"))
        }
    };

    result.unwrap_or_else(|e| e)
}

/// Sends a request to the guard loop and waits for its answer.
async fn ask<T>(
    ctx: &IpcContext,
    build: impl FnOnce(oneshot::Sender<T>) -> GuardMsg,
) -> Result<T, String> {
    let (reply, rx) = oneshot::channel();
    ctx.tx
        .send(build(reply))
        .await
        .map_err(|_| NOT_RUNNING.to_string())?;
    rx.await.map_err(|_| NOT_RUNNING.to_string())
}

async fn handle_info(ctx: &IpcContext, as_json: bool) -> Result<String, String> {
    let snap = ask(ctx, |reply| GuardMsg::GetInfo { reply }).await?;

    if as_json {
        serde_json::to_string_pretty(&snap).map_err(|e| format!("ERROR: {e}"))
    } else {
        Ok(snap.pretty_text.trim_end().to_string())
    }
}

fn handle_activity(ctx: &IpcContext, arg: &str) -> Result<String, String> {
    let kind: ActivityKind = arg.parse().map_err(|e| format!("ERROR: {e}"))?;
    if ctx.hub.subscriber_count() == 0 {
        return Err(NOT_RUNNING.to_string());
    }
    ctx.hub.notify(kind);
    Ok(format!("Activity recorded ({kind})"))
}

async fn handle_unlock(ctx: &IpcContext, args: &str) -> Result<String, String> {
    let as_json = args.split_whitespace().any(|a| a == "--json");
    let Some(candidate) = args.split_whitespace().find(|a| !a.starts_with("--")) else {
        return Err("ERROR: unlock requires a PIN".to_string());
    };

    let candidate = candidate.to_string();
    let outcome = ask(ctx, |reply| GuardMsg::SubmitPin { candidate, reply }).await?;

    if as_json {
        return Ok(render_unlock_json(&outcome).to_string());
    }

    match outcome {
        Ok(_) => Ok("Unlocked".to_string()),
        Err(e) => Err(format!("ERROR: {e}")),
    }
}

fn render_unlock_json<T>(outcome: &Result<T, PinError>) -> serde_json::Value {
    match outcome {
        Ok(_) => json!({ "ok": true }),
        Err(e) => {
            let attempts_remaining = match e {
                PinError::WrongPin { attempts_remaining } => Some(*attempts_remaining),
                PinError::LockedOut => Some(0),
                _ => None,
            };
            json!({
                "ok": false,
                "error": e.kind(),
                "message": e.to_string(),
                "counted": e.is_counted(),
                "attempts_remaining": attempts_remaining,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Unlocked;
    use crate::services::activity::ActivitySource;

    /// Minimal stand-in for the guard loop.
    fn spawn_responder() -> IpcContext {
        let (tx, mut rx) = mpsc::channel::<GuardMsg>(8);
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    GuardMsg::SubmitPin { candidate, reply } => {
                        let out = if candidate == "4821" {
                            Ok(Unlocked)
                        } else {
                            Err(PinError::WrongPin { attempts_remaining: 2 })
                        };
                        let _ = reply.send(out);
                    }
                    GuardMsg::SetRoute { route, reply } => {
                        let _ = reply.send(Ok(format!("Route set: {route}")));
                    }
                    GuardMsg::RequestLogout { reply } => {
                        let _ = reply.send(Ok("Logged out".to_string()));
                    }
                    GuardMsg::Stop { reply } => {
                        let _ = reply.send(Ok("Stopping idlelock".to_string()));
                        break;
                    }
                    _ => {}
                }
            }
        });

        IpcContext { tx, hub: ActivityHub::new() }
    }

    #[tokio::test]
    async fn unlock_renders_text_and_json() {
        let ctx = spawn_responder();

        assert_eq!(route_command("unlock 4821", &ctx).await, "Unlocked");
        assert_eq!(
            route_command("unlock 0000", &ctx).await,
            "ERROR: incorrect PIN, 2 attempts remaining"
        );

        let raw = route_command("unlock 0000 --json", &ctx).await;
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"], "wrong_pin");
        assert_eq!(v["counted"], true);
        assert_eq!(v["attempts_remaining"], 2);

        assert_eq!(route_command("unlock", &ctx).await, "ERROR: unlock requires a PIN");
    }

    #[tokio::test]
    async fn route_and_logout_are_forwarded() {
        let ctx = spawn_responder();
        assert_eq!(route_command("route /reports/42", &ctx).await, "Route set: /reports/42");
        assert_eq!(route_command("route", &ctx).await, "ERROR: route requires a path");
        assert_eq!(route_command("logout", &ctx).await, "Logged out");
    }

    #[tokio::test]
    async fn activity_reaches_subscribers() {
        let ctx = spawn_responder();
        assert_eq!(route_command("activity", &ctx).await, NOT_RUNNING);

        let mut sub = ctx.hub.subscribe();
        assert_eq!(route_command("activity key", &ctx).await, "Activity recorded (keyboard)");
        assert_eq!(sub.recv().await, Some(ActivityKind::Keyboard));

        assert!(route_command("activity blink", &ctx).await.starts_with("ERROR:"));
    }

    #[tokio::test]
    async fn stopped_guard_is_reported() {
        let ctx = spawn_responder();
        assert_eq!(route_command("stop", &ctx).await, "Stopping idlelock");

        // Responder has exited and dropped its receiver.
        tokio::task::yield_now().await;
        assert_eq!(route_command("logout", &ctx).await, NOT_RUNNING);
        assert!(route_command("frobnicate", &ctx).await.starts_with("ERROR: Unknown"));
    }
}
