//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{ClientSettings, API_BASE, DEFAULT_USER_AGENT, IMAGE_CDN_BASE};
use crate::download::{CrawlRequest, CrawlSettings, RetryPolicy, DEFAULT_CONCURRENT_DOWNLOADS};
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub my_account: AccountConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Profile to crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Numeric Weibo user id.
    #[serde(default)]
    pub uid: String,
}

/// Session credentials configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Cookie header copied from a logged-in browser session.
    #[serde(default)]
    pub cookie: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Where images are written.
    #[serde(default)]
    pub image_directory: Option<PathBuf>,

    /// Where live photo clips are written.
    #[serde(default)]
    pub video_directory: Option<PathBuf>,

    /// Concurrent transfers within a page.
    #[serde(default = "default_concurrent_downloads")]
    pub concurrent_downloads: usize,

    /// Retries for transient failures; 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pause between page fetches in milliseconds.
    #[serde(default)]
    pub page_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_image_cdn_base")]
    pub image_cdn_base: String,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            image_directory: None,
            video_directory: None,
            concurrent_downloads: default_concurrent_downloads(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            page_delay_ms: 0,
            request_timeout_secs: default_request_timeout(),
            api_base: default_api_base(),
            image_cdn_base: default_image_cdn_base(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_concurrent_downloads() -> usize {
    DEFAULT_CONCURRENT_DOWNLOADS
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

fn default_image_cdn_base() -> String {
    IMAGE_CDN_BASE.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build the crawl request described by this configuration.
    pub fn crawl_request(&self) -> Result<CrawlRequest> {
        let image_dir = self
            .options
            .image_directory
            .clone()
            .ok_or_else(|| Error::MissingConfig("image_directory".to_string()))?;
        let video_dir = self
            .options
            .video_directory
            .clone()
            .ok_or_else(|| Error::MissingConfig("video_directory".to_string()))?;

        Ok(CrawlRequest::new(
            self.target.uid.trim(),
            self.my_account.cookie.trim(),
            image_dir,
            video_dir,
        ))
    }

    /// Build the crawl settings described by this configuration.
    pub fn crawl_settings(&self) -> CrawlSettings {
        let options = &self.options;
        CrawlSettings {
            client: ClientSettings {
                api_base: options.api_base.clone(),
                image_cdn_base: options.image_cdn_base.clone(),
                user_agent: self.my_account.user_agent.clone(),
                request_timeout: Duration::from_secs(options.request_timeout_secs),
            },
            concurrent_downloads: options.concurrent_downloads,
            retry: RetryPolicy {
                max_retries: options.max_retries,
                base_delay: Duration::from_millis(options.retry_delay_ms),
                ..RetryPolicy::default()
            },
            page_delay: Duration::from_millis(options.page_delay_ms),
        }
    }
}
