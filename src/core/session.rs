// Author: Dustin Pilgrim
// License: MIT

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub logged_in_at: DateTime<Local>,
}

/// The primary session store the guard protects.
///
/// `logout` is the only session mutation the guard performs. Route and lock
/// bookkeeping ride along so a presentation layer and a restarted guard see the
/// same picture.
pub trait SessionStore: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<Session, SessionError>;
    fn logout(&self) -> Result<(), SessionError>;
    fn current_session(&self) -> Option<Session>;
    fn current_route(&self) -> String;
    fn set_route(&self, route: &str) -> Result<(), SessionError>;

    fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    /// Whether the guard for the current session was locked when it last ran.
    fn lock_persisted(&self) -> bool {
        false
    }

    fn persist_lock(&self, _locked: bool) -> Result<(), SessionError> {
        Ok(())
    }
}
