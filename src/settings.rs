//! Settings management for ouoctl
//!
//! Handles persistent configuration including:
//! - Deployment mode (which backend host to talk to)
//! - Base URL override
//! - Request timeout
//! - Notification preferences

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Backend host used in development builds
pub const DEVELOPMENT_BASE_URL: &str = "http://0.0.0.0:8000";

/// Hosted backend
pub const PRODUCTION_BASE_URL: &str = "https://ouoai.herokuapp.com";

/// Deployment mode, selects the default backend host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            DeploymentMode::Development => DEVELOPMENT_BASE_URL,
            DeploymentMode::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::Development => write!(f, "development"),
            DeploymentMode::Production => write!(f, "production"),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deployment mode used when no base URL is set
    pub deployment_mode: DeploymentMode,

    /// Explicit backend base URL, wins over the deployment mode
    pub base_url: Option<String>,

    /// Request timeout in seconds (unset = wait for the backend)
    pub request_timeout_secs: Option<u64>,

    /// Whether to print notifications (they are always logged)
    pub show_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deployment_mode: DeploymentMode::Production,
            base_url: None,
            request_timeout_secs: None,
            show_notifications: true,
        }
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Could not determine settings path")]
    PathNotAvailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl Settings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("Ouo").join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid settings file");
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::PathNotAvailable)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the refresh configuration once, applying command-line overrides
    pub fn resolve(
        &self,
        mode_override: Option<DeploymentMode>,
        base_url_override: Option<&str>,
    ) -> Result<RefreshConfig, SettingsError> {
        let mode = mode_override.unwrap_or(self.deployment_mode);
        // Command line wins, then the settings file, then the mode default
        let raw = base_url_override
            .or(self.base_url.as_deref())
            .unwrap_or_else(|| mode.default_base_url());

        let base_url = parse_base_url(raw)?;

        tracing::debug!(mode = %mode, base_url = %base_url, "Resolved backend");

        Ok(RefreshConfig {
            mode,
            base_url,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SettingsError> {
    // http and https only
    let url = Url::parse(raw.trim()).map_err(|e| SettingsError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SettingsError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Backend configuration handed to the controller
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub mode: DeploymentMode,
    pub base_url: Url,
    pub timeout: Option<Duration>,
}

impl RefreshConfig {
    /// Full URL of the refresh endpoint
    pub fn refresh_url(&self) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/refresh", base))
    }
}
