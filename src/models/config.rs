// src/models/config.rs

//! Application configuration structures.
//!
//! Endpoints, timings, and paths live in a TOML file; credentials come only
//! from the environment (see [`Secrets`]) and are never defaulted in source.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Polling loop settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Dedup store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Government-jobs source settings
    #[serde(default)]
    pub jobs: JobsConfig,

    /// News source settings
    #[serde(default)]
    pub news: NewsConfig,

    /// Link shortener settings
    #[serde(default)]
    pub shortener: ShortenerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.scheduler.poll_interval_secs == 0 {
            return Err(AppError::validation(
                "scheduler.poll_interval_secs must be > 0",
            ));
        }
        if self.storage.seen_path.trim().is_empty() {
            return Err(AppError::validation("storage.seen_path is empty"));
        }
        if self.jobs.list_url.trim().is_empty() {
            return Err(AppError::validation("jobs.list_url is empty"));
        }
        if self.jobs.site_base_url.trim().is_empty() {
            return Err(AppError::validation("jobs.site_base_url is empty"));
        }
        if self.news.collection_url.trim().is_empty() {
            return Err(AppError::validation("news.collection_url is empty"));
        }
        if self.news.image_base_url.trim().is_empty() {
            return Err(AppError::validation("news.image_base_url is empty"));
        }
        if self.shortener.api_url.trim().is_empty() {
            return Err(AppError::validation("shortener.api_url is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for outbound requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sleep between polling passes, in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// Pause after a failed pass before polling again, in seconds
    #[serde(default = "defaults::recovery_pause")]
    pub recovery_pause_secs: u64,
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn recovery_pause(&self) -> Duration {
        Duration::from_secs(self.recovery_pause_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::poll_interval(),
            recovery_pause_secs: defaults::recovery_pause(),
        }
    }
}

/// Dedup store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the delivered-ids file
    #[serde(default = "defaults::seen_path")]
    pub seen_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seen_path: defaults::seen_path(),
        }
    }
}

/// Government-jobs source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Listing endpoint, queried with the full unfiltered list flag
    #[serde(default = "defaults::jobs_list_url")]
    pub list_url: String,

    /// Site base for circular and apply links
    #[serde(default = "defaults::jobs_site_base_url")]
    pub site_base_url: String,

    /// Pause after each delivered job, in seconds
    #[serde(default = "defaults::jobs_pacing")]
    pub pacing_secs: u64,
}

impl JobsConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_secs(self.pacing_secs)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            list_url: defaults::jobs_list_url(),
            site_base_url: defaults::jobs_site_base_url(),
            pacing_secs: defaults::jobs_pacing(),
        }
    }
}

/// News source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Collection endpoint returning a bounded page of stories
    #[serde(default = "defaults::news_collection_url")]
    pub collection_url: String,

    /// Site base for story links
    #[serde(default = "defaults::news_site_base_url")]
    pub site_base_url: String,

    /// Image host base for resolved photo keys
    #[serde(default = "defaults::news_image_base_url")]
    pub image_base_url: String,

    /// Referer header expected by the image host
    #[serde(default = "defaults::news_referer")]
    pub referer: String,

    /// Pause after each delivered story, in seconds
    #[serde(default = "defaults::news_pacing")]
    pub pacing_secs: u64,
}

impl NewsConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_secs(self.pacing_secs)
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            collection_url: defaults::news_collection_url(),
            site_base_url: defaults::news_site_base_url(),
            image_base_url: defaults::news_image_base_url(),
            referer: defaults::news_referer(),
            pacing_secs: defaults::news_pacing(),
        }
    }
}

/// Link shortener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    /// Shortening service endpoint
    #[serde(default = "defaults::shortener_api_url")]
    pub api_url: String,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::shortener_api_url(),
        }
    }
}

/// Credentials, sourced from the environment only.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// Bot token for the messaging platform
    pub bot_token: String,

    /// Channel the bulletins are posted to
    pub channel_id: String,

    /// Shortener credential; `None` disables shortening
    pub shortener_token: Option<String>,
}

impl Secrets {
    /// Load credentials from the environment (a `.env` file is honored).
    ///
    /// A missing bot token or channel id is a fatal startup condition; a
    /// missing shortener token only turns shortening into a pass-through.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bot_token = require_env("BOT_TOKEN")?;
        let channel_id = require_env("CHANNEL_ID")?;
        let shortener_token = std::env::var("BITLY_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            bot_token,
            channel_id,
            shortener_token,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("{name} environment variable is required")))
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bulletin/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Scheduler defaults
    pub fn poll_interval() -> u64 {
        300
    }
    pub fn recovery_pause() -> u64 {
        60
    }

    // Storage defaults
    pub fn seen_path() -> String {
        "data/seen.json".into()
    }

    // Jobs source defaults
    pub fn jobs_list_url() -> String {
        "https://alljobs.teletalk.com.bd/api/v1/govt-jobs/list?skipLimit=YES".into()
    }
    pub fn jobs_site_base_url() -> String {
        "https://alljobs.teletalk.com.bd".into()
    }
    pub fn jobs_pacing() -> u64 {
        5
    }

    // News source defaults
    pub fn news_collection_url() -> String {
        "https://www.prothomalo.com/api/v1/collections/latest?limit=15&item-type=story&fields=id,headline,slug,url,subheadline,cards,metadata".into()
    }
    pub fn news_site_base_url() -> String {
        "https://www.prothomalo.com".into()
    }
    pub fn news_image_base_url() -> String {
        "https://images.prothomalo.com".into()
    }
    pub fn news_referer() -> String {
        "https://www.prothomalo.com/".into()
    }
    pub fn news_pacing() -> u64 {
        10
    }

    // Shortener defaults
    pub fn shortener_api_url() -> String {
        "https://api-ssl.bitly.com/v4/shorten".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.scheduler.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scheduler.poll_interval_secs, 300);
        assert_eq!(config.jobs.pacing_secs, 5);
        assert_eq!(config.news.pacing_secs, 10);
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let config: Config = toml::from_str(
            r#"
            [scheduler]
            poll_interval_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.poll_interval_secs, 60);
        assert_eq!(config.scheduler.recovery_pause_secs, 60);
        assert_eq!(config.http.timeout_secs, 30);
    }
}
