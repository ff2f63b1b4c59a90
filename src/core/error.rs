// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

/// Configuration values that cannot describe a working guard.
///
/// Examples:
/// - max_attempts of zero
/// - a configured PIN that does not match pin_length
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroMaxAttempts,
    ZeroPinLength,
    ZeroIdleTimeout,
    ZeroTickInterval,
    MissingPin,
    PinLengthMismatch { expected: usize },
}

/// Why an unlock attempt did not unlock the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// Candidate is not exactly `pin_length` ASCII digits. Not counted.
    InvalidFormat,

    /// Verified and rejected. Counted against `max_attempts`.
    WrongPin { attempts_remaining: u32 },

    /// Attempts exhausted; the session is being logged out.
    LockedOut,

    /// The verifier failed or timed out. Not counted, retryable.
    VerificationUnavailable,

    /// Another verification is still in flight for this guard.
    Busy,

    /// The session is not locked.
    NotLocked,

    /// The guard has reached forced logout (or was torn down).
    SessionEnded,
}

impl PinError {
    /// Counted failures are the only ones that touch `attempts_used`.
    pub fn is_counted(&self) -> bool {
        matches!(self, PinError::WrongPin { .. } | PinError::LockedOut)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PinError::InvalidFormat => "invalid_format",
            PinError::WrongPin { .. } => "wrong_pin",
            PinError::LockedOut => "locked_out",
            PinError::VerificationUnavailable => "verification_unavailable",
            PinError::Busy => "busy",
            PinError::NotLocked => "not_locked",
            PinError::SessionEnded => "session_ended",
        }
    }
}

/// Failure reported by the primary session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    InvalidCredentials,
    NotAuthenticated,
    Storage(String),
}

/// Failure of the verification call itself (not a wrong PIN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    TimedOut,
    Backend(String),
}

// ---------------- Display ----------------

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroMaxAttempts =>
                write!(f, "max_attempts must be at least 1"),
            ConfigError::ZeroPinLength =>
                write!(f, "pin_length must be at least 1"),
            ConfigError::ZeroIdleTimeout =>
                write!(f, "idle_timeout must be greater than zero"),
            ConfigError::ZeroTickInterval =>
                write!(f, "tick_interval must be greater than zero"),
            ConfigError::MissingPin =>
                write!(f, "no unlock PIN configured (set guard.pin or IDLELOCK_PIN)"),
            ConfigError::PinLengthMismatch { expected } =>
                write!(f, "configured PIN must be exactly {expected} digits"),
        }
    }
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::InvalidFormat =>
                write!(f, "PIN has the wrong format"),
            PinError::WrongPin { attempts_remaining } =>
                write!(f, "incorrect PIN, {attempts_remaining} attempts remaining"),
            PinError::LockedOut =>
                write!(f, "too many incorrect attempts, logging out"),
            PinError::VerificationUnavailable =>
                write!(f, "PIN verification unavailable, try again"),
            PinError::Busy =>
                write!(f, "a PIN check is already in progress"),
            PinError::NotLocked =>
                write!(f, "session is not locked"),
            PinError::SessionEnded =>
                write!(f, "session has ended"),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidCredentials =>
                write!(f, "invalid credentials"),
            SessionError::NotAuthenticated =>
                write!(f, "no authenticated session"),
            SessionError::Storage(msg) =>
                write!(f, "session storage failed: {msg}"),
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::TimedOut => write!(f, "verification timed out"),
            VerifyError::Backend(msg) => write!(f, "verification failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for PinError {}
impl std::error::Error for SessionError {}
impl std::error::Error for VerifyError {}

