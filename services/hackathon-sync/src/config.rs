//! Configuration types for the hackathon sync layer

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::model::MAX_LIMIT;

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "HACKATHON_API_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub lists: ListConfig,
    #[serde(default)]
    pub outreach: OutreachConfig,
}

/// Remote API location and transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Unset means the transport's own defaults apply
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Sizes of the directory listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_list_limit")]
    pub limit: usize,
    /// How many entries the "recent" panels show
    #[serde(default = "default_recent")]
    pub recent: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            limit: default_list_limit(),
            recent: default_recent(),
        }
    }
}

/// Invite and email parameters for hackathon outreach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachConfig {
    #[serde(default = "default_outreach_limit")]
    pub invite_limit: usize,
    #[serde(default = "default_outreach_limit")]
    pub email_limit: usize,
    #[serde(default = "default_true")]
    pub dry_run: bool,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            invite_limit: default_outreach_limit(),
            email_limit: default_outreach_limit(),
            dry_run: true,
        }
    }
}

impl Config {
    /// Apply `HACKATHON_API_URL` if it is set and non-empty
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!("{} overrides api.base_url with {}", API_URL_ENV, url);
                self.api.base_url = url.to_string();
            }
        }
    }

    /// Reject values the API or the poller cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.polling.interval_ms == 0 {
            return Err(crate::SyncError::Config(
                "polling.interval_ms must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("lists.limit", self.lists.limit),
            ("outreach.invite_limit", self.outreach.invite_limit),
            ("outreach.email_limit", self.outreach.email_limit),
        ] {
            if value == 0 || value > MAX_LIMIT {
                return Err(crate::SyncError::Config(format!(
                    "{} must be within 1..={}, got {}",
                    name, MAX_LIMIT, value
                )));
            }
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_list_limit() -> usize {
    50
}

fn default_recent() -> usize {
    8
}

fn default_outreach_limit() -> usize {
    20
}

fn default_true() -> bool {
    true
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::SyncError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
