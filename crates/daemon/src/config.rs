// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Daemon configuration: fixed state-dir paths plus TOML settings.

use crate::env;
use gl_knx::KnxConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Tunable settings loaded from the TOML config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cadence of the supervisor health loop
    pub health_check_interval_ms: u64,
    pub knx: KnxConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            health_check_interval_ms: 30_000,
            knx: KnxConfig::default(),
        }
    }
}

impl Settings {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }
}

/// Daemon configuration: file locations and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/graylogic)
    pub state_dir: PathBuf,
    /// Path to the daemon's own lock/PID file
    pub lock_path: PathBuf,
    /// Path to the daemon log file
    pub log_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Load configuration.
    ///
    /// Settings come from `$GL_CONFIG` or `<state_dir>/config.toml`; a
    /// missing file means defaults. Fixed paths live under the state dir.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        let settings_path = env::config_path()
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("config.toml"));

        let settings = if settings_path.exists() {
            let text =
                std::fs::read_to_string(&settings_path).map_err(|source| ConfigError::Io {
                    path: settings_path.clone(),
                    source,
                })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: settings_path.clone(),
                source,
            })?
        } else {
            Settings::default()
        };

        Ok(Self {
            lock_path: state_dir.join("gld.pid"),
            log_path: state_dir.join("gld.log"),
            state_dir,
            settings,
        })
    }
}

/// State directory resolution: `GL_STATE_DIR`, then
/// `$XDG_STATE_HOME/graylogic`, then `~/.local/state/graylogic`.
fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::state_dir() {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = env::xdg_state_home() {
        return Ok(PathBuf::from(xdg).join("graylogic"));
    }
    let home = env::home().ok_or(ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/graylogic"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
