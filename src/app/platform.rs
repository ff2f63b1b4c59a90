// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("idlelock").join("idlelock.log"))
}

// ---------------- logging ----------------

/// File logging always; console only when verbose. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut file_err = None;
    let file_layer = default_log_path().and_then(|path| match open_log_file(&path) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        ),
        Err(e) => {
            file_err = Some(format!("failed to enable file logging at {}: {e}", path.display()));
            None
        }
    });

    let console_layer = verbose.then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    if let Some(e) = file_err {
        tracing::error!("{e}");
    }
    if verbose {
        tracing::debug!("debug logging enabled");
    }
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    let policy = crate::guard_log::LogPolicy::default();
    let previous_run = crate::guard_log::prepare_log_file(path, &policy)?;
    crate::guard_log::write_run_header(path, previous_run)?;
    fs::OpenOptions::new().create(true).append(true).open(path)
}

// ---------------- single-instance lock ----------------

fn lock_path() -> Result<PathBuf, String> {
    Ok(crate::ipc::runtime_dir()?.join("idlelock").join("idlelock.lock"))
}

pub fn acquire_single_instance_lock() -> Result<UnixListener, String> {
    bind_instance_lock(&lock_path()?)
}

fn bind_instance_lock(path: &Path) -> Result<UnixListener, String> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match UnixListener::bind(path) {
        Ok(l) => Ok(l),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => match UnixStream::connect(path) {
            Ok(_) => Err(format!(
                "idlelock is already running (another instance holds {})",
                path.display()
            )),
            Err(_) => {
                let _ = fs::remove_file(path);
                UnixListener::bind(path)
                    .map_err(|e| format!("failed to bind instance lock {}: {e}", path.display()))
            }
        },
        Err(e) => Err(format!("failed to bind instance lock {}: {e}", path.display())),
    }
}
