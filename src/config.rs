//! Configuration Management
//!
//! Handles persistent configuration storage for the `rds` CLI.

use crate::resource::ResolutionPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// API used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://covid19.richdataservices.com/rds";

/// Environment variable overriding the configured API url
pub const API_URL_ENV: &str = "RDS_API_URL";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Last used API url
    #[serde(default)]
    pub api_url: Option<String>,
    /// Request timeout in seconds, none by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Share one in-flight resolution between overlapping callers
    #[serde(default)]
    pub single_flight: bool,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rds").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config at {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective API url (CLI > env > config > default)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| std::env::var(API_URL_ENV).ok().filter(|url| !url.is_empty()))
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Get effective request timeout (CLI > config)
    pub fn effective_timeout(&self, cli: Option<u64>) -> Option<Duration> {
        cli.or(self.timeout_secs).map(Duration::from_secs)
    }

    pub fn resolution_policy(&self) -> ResolutionPolicy {
        if self.single_flight {
            ResolutionPolicy::SingleFlight
        } else {
            ResolutionPolicy::Concurrent
        }
    }

    /// Set API url and save
    pub fn set_api_url(&mut self, api_url: &str) -> Result<()> {
        self.api_url = Some(api_url.to_string());
        self.save()
    }
}
