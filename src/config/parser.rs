// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

use eyre::{eyre, Result};
use regex::Regex;
use rune_cfg::{RuneConfig, Value};

use crate::core::config::{GuardConfig, Pattern};

use super::pattern::parse_route_pattern;

/// Builds a `GuardConfig` from the `guard:` block; absent keys keep their defaults.
pub fn parse_guard_config(config: &RuneConfig) -> Result<GuardConfig> {
    let mut cfg = GuardConfig::default();

    if let Ok(secs) = config
        .get::<u64>("guard.idle_timeout_seconds")
        .or_else(|_| config.get::<u64>("guard.idle-timeout-seconds"))
    {
        cfg.idle_timeout = Duration::from_secs(secs);
    }

    if let Ok(ms) = config
        .get::<u64>("guard.tick_interval_ms")
        .or_else(|_| config.get::<u64>("guard.tick-interval-ms"))
    {
        cfg.tick_interval = Duration::from_millis(ms);
    }

    if let Ok(n) = config
        .get::<u64>("guard.max_attempts")
        .or_else(|_| config.get::<u64>("guard.max-attempts"))
    {
        cfg.max_attempts =
            u32::try_from(n).map_err(|_| eyre!("guard.max_attempts is out of range: {n}"))?;
    }

    if let Ok(n) = config
        .get::<u64>("guard.pin_length")
        .or_else(|_| config.get::<u64>("guard.pin-length"))
    {
        cfg.pin_length =
            usize::try_from(n).map_err(|_| eyre!("guard.pin_length is out of range: {n}"))?;
    }

    if let Ok(ms) = config
        .get::<u64>("guard.verification_latency_ms")
        .or_else(|_| config.get::<u64>("guard.verification-latency-ms"))
    {
        cfg.verification_latency = Duration::from_millis(ms);
    }

    if let Ok(secs) = config
        .get::<u64>("guard.verification_timeout_seconds")
        .or_else(|_| config.get::<u64>("guard.verification-timeout-seconds"))
    {
        cfg.verification_timeout = Duration::from_secs(secs);
    }

    if let Ok(secs) = config
        .get::<u64>("guard.grace_period_seconds")
        .or_else(|_| config.get::<u64>("guard.grace-period-seconds"))
    {
        cfg.grace_period = Duration::from_secs(secs);
    }

    if let Ok(route) = config
        .get::<String>("guard.login_route")
        .or_else(|_| config.get::<String>("guard.login-route"))
    {
        let route = route.trim();
        if !route.is_empty() {
            cfg.login_route = route.to_string();
        }
    }

    if let Ok(v) = config
        .get_value("guard.public_routes")
        .or_else(|_| config.get_value("guard.public-routes"))
    {
        cfg.public_routes = parse_public_routes(&v)?;
    }

    cfg.pin = config
        .get::<String>("guard.pin")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    tracing::debug!("parsed guard config: {:?}", cfg);
    Ok(cfg)
}

fn parse_public_routes(v: &Value) -> Result<Vec<Pattern>> {
    let Value::Array(arr) = v else {
        return Err(eyre!("guard.public_routes must be a list"));
    };

    arr.iter()
        .map(|v| match v {
            Value::String(s) => parse_route_pattern(s).map_err(|e| eyre!("{e}")),
            Value::Regex(s) => Regex::new(s)
                .map(Pattern::Regex)
                .map_err(|e| eyre!("Invalid regex in public_routes: {e}")),
            _ => Err(eyre!("guard.public_routes entries must be strings or regexes")),
        })
        .collect()
}
