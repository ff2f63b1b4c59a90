// Author: Dustin Pilgrim
// License: MIT

use std::future::Future;
use std::path::Path;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::UnixStream,
    time::{timeout, Duration},
};

const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// `reply_timeout` should match the daemon's `GuardConfig::ipc_reply_timeout`;
/// an unlock waits on PIN verification.
pub async fn send_raw(cmd: &str, reply_timeout: Duration) -> Result<String, String> {
    let path = crate::ipc::socket_path()?;
    send_to(&path, cmd, reply_timeout).await
}

/// Bounded I/O step; `what` names the step in error messages.
async fn step<T>(
    limit: Duration,
    what: &str,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T, String> {
    match timeout(limit, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(format!("{what} failed: {e}")),
        Err(_) => Err(format!("timeout during {what}")),
    }
}

/// One request, one reply: write the command, half-close, read to EOF.
pub async fn send_to(path: &Path, cmd: &str, reply_timeout: Duration) -> Result<String, String> {
    if !path.exists() {
        return Err("daemon not running".to_string());
    }

    let mut stream = step(IO_TIMEOUT, "connect", UnixStream::connect(path))
        .await
        .map_err(|e| format!("{e} ({})", path.display()))?;

    step(IO_TIMEOUT, "write", stream.write_all(cmd.as_bytes())).await?;
    step(IO_TIMEOUT, "shutdown", stream.shutdown()).await?;

    let mut resp = Vec::new();
    step(reply_timeout, "read", stream.read_to_end(&mut resp)).await?;

    Ok(String::from_utf8_lossy(&resp).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UnixListener;

    #[tokio::test]
    async fn slow_reply_hits_the_caller_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf).await;
            tokio::time::sleep(Duration::from_millis(400)).await;
            let _ = stream.write_all(b"Unlocked").await;
        });

        let err = send_to(&path, "unlock 4821", Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(err, "timeout during read");
        server.abort();
    }
}
