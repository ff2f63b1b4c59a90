// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use rune_cfg::RuneConfig;

use crate::core::config::GuardConfig;

pub mod parser;
pub mod pattern;

/// Environment variable that overrides the configured PIN.
pub const PIN_ENV: &str = "IDLELOCK_PIN";

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".config/idlelock/idlelock.rune");
        p
    })
}

fn system_config_path() -> PathBuf {
    PathBuf::from("/etc/idlelock/idlelock.rune")
}

/// Determine which config file to read.
///
/// An explicit path is returned as-is (a missing file is reported by the loader).
/// Otherwise the user config wins over the system config; `None` means defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    if let Some(user) = user_config_path() {
        if user.exists() {
            return Some(user);
        }
    }

    let system = system_config_path();
    if system.exists() {
        return Some(system);
    }

    None
}

/// Loads and validates the guard configuration.
pub fn load(explicit: Option<&Path>) -> Result<GuardConfig> {
    let mut cfg = match resolve_config_path(explicit) {
        Some(path) => {
            let rune = RuneConfig::from_file(&path)
                .map_err(|e| eyre::eyre!("failed to load config from {}: {e}", path.display()))?;
            let cfg = parser::parse_guard_config(&rune)
                .wrap_err_with(|| format!("invalid config in {}", path.display()))?;
            tracing::info!("loaded config from {}", path.display());
            cfg
        }
        None => {
            tracing::info!("no config file found; using built-in defaults");
            GuardConfig::default()
        }
    };

    apply_env_overrides(&mut cfg, std::env::var(PIN_ENV).ok());

    cfg.validate().wrap_err("configuration rejected")?;
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut GuardConfig, pin: Option<String>) {
    if let Some(pin) = pin.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
        tracing::debug!("pin taken from {PIN_ENV}");
        cfg.pin = Some(pin);
    }
}
