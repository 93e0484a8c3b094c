// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from a TOML file, with `PORTER_*` environment overrides applied
//! on top. Every field has a default so an empty file (or no file) yields a
//! working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Global ceiling on concurrently running executions
    pub max_concurrent: usize,
    /// Run logs older than this many days are purged by the sweeper
    pub retention_days: u32,
    /// Fixed offset applied when evaluating cron schedules, in minutes
    /// east of UTC
    pub utc_offset_minutes: i32,
    /// How long shutdown waits for in-flight executions before cancelling
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
    /// Directory for the write-ahead log and materialized state
    pub data_dir: PathBuf,
    /// Directory for daemon log files
    pub log_dir: PathBuf,
    /// Webhook endpoint for run notifications; none disables notifications
    pub webhook_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            retention_days: 30,
            utc_offset_minutes: 0,
            shutdown_grace: Duration::from_secs(30),
            data_dir: PathBuf::from("/var/lib/porter"),
            log_dir: PathBuf::from("/var/log/porter"),
            webhook_url: None,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `PORTER_*` environment overrides on top of the loaded values
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = env_var("PORTER_MAX_CONCURRENT") {
            self.max_concurrent = parse_env("PORTER_MAX_CONCURRENT", &value)?;
        }
        if let Some(value) = env_var("PORTER_RETENTION_DAYS") {
            self.retention_days = parse_env("PORTER_RETENTION_DAYS", &value)?;
        }
        if let Some(value) = env_var("PORTER_UTC_OFFSET_MINUTES") {
            self.utc_offset_minutes = parse_env("PORTER_UTC_OFFSET_MINUTES", &value)?;
        }
        if let Some(value) = env_var("PORTER_SHUTDOWN_GRACE_SECS") {
            let secs: u64 = parse_env("PORTER_SHUTDOWN_GRACE_SECS", &value)?;
            self.shutdown_grace = Duration::from_secs(secs);
        }
        if let Some(value) = env_var("PORTER_DATA_DIR") {
            self.data_dir = PathBuf::from(value);
        }
        if let Some(value) = env_var("PORTER_LOG_DIR") {
            self.log_dir = PathBuf::from(value);
        }
        if let Some(value) = env_var("PORTER_WEBHOOK_URL") {
            self.webhook_url = if value.is_empty() { None } else { Some(value) };
        }
        Ok(self)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
