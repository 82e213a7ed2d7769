//! Runtime configuration.
//!
//! Loaded from an optional YAML file, then overridden from the environment.
//! Every field has a default, so an empty file (or no file) is valid.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides `staging_dir`.
pub const STAGING_DIR_ENV: &str = "SHEETBRIDGE_STAGING_DIR";
/// Overrides `chat_webhook_url`.
pub const CHAT_WEBHOOK_ENV: &str = "SHEETBRIDGE_CHAT_WEBHOOK_URL";

/// Base URLs of the Google services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub sheets: String,
    pub drive: String,
    pub bigquery: String,
    pub token: String,
    pub metadata: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            sheets: "https://sheets.googleapis.com".to_string(),
            drive: "https://www.googleapis.com".to_string(),
            bigquery: "https://bigquery.googleapis.com".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            metadata: "http://metadata.google.internal".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Point every service at one base URL. Handy for mock servers.
    #[must_use]
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            sheets: base.to_string(),
            drive: base.to_string(),
            bigquery: base.to_string(),
            token: format!("{base}/token"),
            metadata: base.to_string(),
        }
    }
}

/// sheetbridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Service base URLs.
    pub endpoints: ApiEndpoints,
    /// Directory where upload payloads are written before sending.
    pub staging_dir: PathBuf,
    /// Google Chat incoming webhook, including its key and token.
    pub chat_webhook_url: Option<String>,
    /// Delay between warehouse job status checks.
    pub job_poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            staging_dir: std::env::temp_dir(),
            chat_webhook_url: None,
            job_poll_interval_ms: 1000,
        }
    }
}

impl BridgeConfig {
    /// Load the config file (when given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> BridgeResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a YAML config file.
    pub fn from_file(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse YAML config content.
    pub fn from_yaml_str(content: &str) -> BridgeResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Apply overrides from a variable lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(STAGING_DIR_ENV).filter(|v| !v.is_empty()) {
            self.staging_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(CHAT_WEBHOOK_ENV).filter(|v| !v.is_empty()) {
            self.chat_webhook_url = Some(url);
        }
    }

    /// Where an upload named `file_name` is staged.
    ///
    /// `file_name` must be a bare file name: no directories, no `..`, not
    /// absolute. Anything else is rejected so staging never leaves
    /// `staging_dir`.
    pub fn staging_path(&self, file_name: &str) -> BridgeResult<PathBuf> {
        let bare = Path::new(file_name).file_name() == Some(OsStr::new(file_name));
        if !bare || file_name.contains(['/', '\\']) {
            return Err(BridgeError::invalid_argument(format!(
                "{file_name:?} is not a plain file name"
            )));
        }
        Ok(self.staging_dir.join(file_name))
    }

    /// Job poll interval as a `Duration`.
    #[must_use]
    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms)
    }
}
