// Author: Dustin Pilgrim
// License: MIT

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    task::JoinHandle,
    time::{timeout, Duration},
};

use super::router::{route_command, IpcContext};

/// Longest command line accepted from a client.
const MAX_REQUEST_BYTES: u64 = 1024;

/// Spawns the IPC socket server. Each connection carries one command.
///
/// `conn_timeout` must cover a full PIN verification.
pub fn spawn_ipc_server(
    listener: UnixListener,
    ctx: IpcContext,
    conn_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut stream, _addr)) => {
                    let ctx = ctx.clone();

                    tokio::spawn(async move {
                        let result = timeout(conn_timeout, async {
                            if let Err(e) = handle_connection(&mut stream, &ctx).await {
                                tracing::error!("error handling IPC connection: {e}");
                            }
                        })
                        .await;

                        if result.is_err() {
                            tracing::error!("IPC connection timed out after {:?}", conn_timeout);
                        }

                        let _ = stream.shutdown().await;
                    });
                }
                Err(e) => tracing::error!("failed to accept IPC connection: {e}"),
            }
        }
    })
}

async fn handle_connection(stream: &mut UnixStream, ctx: &IpcContext) -> std::io::Result<()> {
    let mut buf = Vec::new();
    (&mut *stream).take(MAX_REQUEST_BYTES).read_to_end(&mut buf).await?;

    if buf.is_empty() {
        return Ok(());
    }

    let cmd = String::from_utf8_lossy(&buf).trim().to_string();

    // PINs stay out of the log.
    if cmd.starts_with("unlock") {
        tracing::debug!("received IPC command: unlock <redacted>");
    } else {
        tracing::debug!("received IPC command: {cmd}");
    }

    let response = route_command(&cmd, ctx).await;

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}
