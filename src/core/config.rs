// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use crate::core::error::ConfigError;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_PIN_LENGTH: usize = 4;
pub const DEFAULT_VERIFICATION_LATENCY: Duration = Duration::from_secs(1);
pub const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Headroom on top of a full verification for one IPC round trip.
pub const IPC_SLACK: Duration = Duration::from_secs(5);

/// Pattern used for the public-route list.
///
/// - Literals match the exact path or anything below it (`/login` matches `/login/sso`).
/// - Regex values are compiled by the config loader.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(s) => write!(f, "{s}"),
            Pattern::Regex(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

impl Pattern {
    pub fn matches_route(&self, route: &str) -> bool {
        match self {
            Pattern::Literal(s) => {
                let s = s.trim_end_matches('/');
                if s.is_empty() {
                    return route.is_empty() || route == "/";
                }
                route == s
                    || route
                        .strip_prefix(s)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Pattern::Regex(r) => r.is_match(route),
        }
    }
}

/// Decides whether a route is exempt from idle locking.
pub type RoutePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Immutable configuration for one guard.
#[derive(Clone)]
pub struct GuardConfig {
    pub idle_timeout: Duration,
    pub tick_interval: Duration,
    pub max_attempts: u32,
    pub pin_length: usize,

    /// Artificial latency of the bundled verifier.
    pub verification_latency: Duration,

    /// Upper bound on a single verification call.
    pub verification_timeout: Duration,

    pub grace_period: Duration,
    pub login_route: String,
    pub public_routes: Vec<Pattern>,

    /// Overrides `public_routes` when set.
    pub public_route_predicate: Option<RoutePredicate>,

    /// Expected PIN for the static verifier. Never logged.
    pub pin: Option<String>,
}

impl fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardConfig")
            .field("idle_timeout", &self.idle_timeout)
            .field("tick_interval", &self.tick_interval)
            .field("max_attempts", &self.max_attempts)
            .field("pin_length", &self.pin_length)
            .field("verification_latency", &self.verification_latency)
            .field("verification_timeout", &self.verification_timeout)
            .field("grace_period", &self.grace_period)
            .field("login_route", &self.login_route)
            .field("public_routes", &self.public_routes)
            .field("public_route_predicate", &self.public_route_predicate.is_some())
            .field("pin", &self.pin.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pin_length: DEFAULT_PIN_LENGTH,
            verification_latency: DEFAULT_VERIFICATION_LATENCY,
            verification_timeout: DEFAULT_VERIFICATION_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            public_routes: vec![
                Pattern::Literal("/login".to_string()),
                Pattern::Literal("/signup".to_string()),
                Pattern::Literal("/forgot-password".to_string()),
            ],
            public_route_predicate: None,
            pin: None,
        }
    }
}

impl GuardConfig {
    pub fn is_public_route(&self, route: &str) -> bool {
        match &self.public_route_predicate {
            Some(pred) => pred(route),
            None => self.public_routes.iter().any(|p| p.matches_route(route)),
        }
    }

    /// Exactly `pin_length` ASCII digits.
    pub fn is_well_formed_pin(&self, candidate: &str) -> bool {
        candidate.len() == self.pin_length && candidate.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        if self.pin_length == 0 {
            return Err(ConfigError::ZeroPinLength);
        }
        if self.idle_timeout.is_zero() {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if let Some(pin) = &self.pin {
            if !self.is_well_formed_pin(pin) {
                return Err(ConfigError::PinLengthMismatch { expected: self.pin_length });
            }
        }
        Ok(())
    }

    /// How long one IPC exchange may take. An unlock waits for the verifier,
    /// so both ends of the socket derive their limit from it.
    pub fn ipc_reply_timeout(&self) -> Duration {
        self.verification_latency + self.verification_timeout + IPC_SLACK
    }

    /// The PIN the bundled verifier checks against.
    pub fn expected_pin(&self) -> Result<&str, ConfigError> {
        self.pin.as_deref().ok_or(ConfigError::MissingPin)
    }
}
