// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::core::error::SessionError;
use crate::core::session::{Credentials, Session, SessionStore};

const DEFAULT_ROUTE: &str = "/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    session: Option<Session>,

    #[serde(default)]
    route: Option<String>,

    /// The guard was locked when it last wrote. Cleared on unlock and logout.
    #[serde(default)]
    locked: bool,
}

/// Session store backed by a small JSON file, so a session (and an active
/// lock) survives a daemon restart.
///
/// The file is the source of truth: `idlelock login` and the daemon are
/// separate processes, so every read and write goes back to disk. The
/// in-memory copy only answers reads while the file is unreadable.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    last_good: Mutex<StoreFile>,
}

pub fn default_store_path() -> PathBuf {
    let mut path = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    path.push("idlelock");
    path.push("session.json");
    path
}

/// A missing file is an empty store; an unreadable one is an error.
fn load(path: &Path) -> Result<StoreFile, SessionError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::Storage(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
        Err(e) => Err(SessionError::Storage(format!("{}: {e}", path.display()))),
    }
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let file = load(&path)?;
        Ok(Self { path, last_good: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-modify-write against the current file contents.
    fn with_file<T>(
        &self,
        f: impl FnOnce(&mut StoreFile) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut cached = self
            .last_good
            .lock()
            .map_err(|_| SessionError::Storage("store lock poisoned".to_string()))?;

        let mut next = load(&self.path)?;
        let out = f(&mut next)?;
        write_atomic(&self.path, &next)?;
        *cached = next;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreFile) -> T) -> T {
        let mut cached = self.last_good.lock().unwrap_or_else(|p| p.into_inner());
        match load(&self.path) {
            Ok(file) => *cached = file,
            Err(e) => tracing::warn!("session store unreadable, using last known state: {e}"),
        }
        f(&*cached)
    }
}

fn write_atomic(path: &Path, file: &StoreFile) -> Result<(), SessionError> {
    let storage = |e: std::io::Error| SessionError::Storage(format!("{}: {e}", path.display()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(storage)?;
    }

    let bytes = serde_json::to_vec_pretty(file)
        .map_err(|e| SessionError::Storage(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(storage)?;
    fs::rename(&tmp, path).map_err(storage)?;
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn login(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        let user = credentials.user.trim();
        if user.is_empty() {
            return Err(SessionError::InvalidCredentials);
        }

        let session = Session {
            user: user.to_string(),
            logged_in_at: Local::now(),
        };

        self.with_file(|f| {
            f.session = Some(session.clone());
            f.route = Some(DEFAULT_ROUTE.to_string());
            f.locked = false;
            Ok(())
        })?;

        tracing::info!("session started for {}", session.user);
        Ok(session)
    }

    fn logout(&self) -> Result<(), SessionError> {
        self.with_file(|f| {
            let Some(session) = f.session.take() else {
                return Err(SessionError::NotAuthenticated);
            };
            f.locked = false;
            tracing::info!("session ended for {}", session.user);
            Ok(())
        })
    }

    fn current_session(&self) -> Option<Session> {
        self.read(|f| f.session.clone())
    }

    fn current_route(&self) -> String {
        self.read(|f| f.route.clone().unwrap_or_else(|| DEFAULT_ROUTE.to_string()))
    }

    fn set_route(&self, route: &str) -> Result<(), SessionError> {
        let route = route.trim().to_string();
        self.with_file(|f| {
            f.route = Some(route);
            Ok(())
        })
    }

    fn lock_persisted(&self) -> bool {
        self.read(|f| f.session.is_some() && f.locked)
    }

    fn persist_lock(&self, locked: bool) -> Result<(), SessionError> {
        self.with_file(|f| {
            if f.session.is_none() {
                return Err(SessionError::NotAuthenticated);
            }
            f.locked = locked;
            Ok(())
        })
    }
}
