// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Per-page retry policy settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Listing site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for offer extraction
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
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
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == Some(0) {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.site.base_url.trim().is_empty() {
            return Err(AppError::validation("site.base_url is empty"));
        }
        if self.site.max_page == 0 {
            return Err(AppError::validation("site.max_page must be > 0"));
        }
        if self.output.file_prefix.trim().is_empty() {
            return Err(AppError::validation("output.file_prefix is empty"));
        }
        Ok(())
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between sequential requests in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Worker pool size override; derived from available parallelism if unset
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    /// Stop the run after this many consecutive page failures; 0 disables
    #[serde(default)]
    pub max_consecutive_failures: u32,
}

impl ScraperConfig {
    /// Effective worker pool size for concurrent dispatch.
    ///
    /// One core is left free for the aggregation loop.
    pub fn worker_count(&self) -> usize {
        match self.max_concurrent {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
                .max(1),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: 0,
            max_concurrent: None,
            max_consecutive_failures: 0,
        }
    }
}

/// Per-page retry policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per page, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Fixed backoff between attempts in milliseconds
    #[serde(default = "defaults::backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            backoff_ms: defaults::backoff_ms(),
        }
    }
}

/// Listing site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the listing site
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Highest page index the site serves reliably; pagination breaks past it
    #[serde(default = "defaults::max_page")]
    pub max_page: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            max_page: defaults::max_page(),
        }
    }
}

/// CSS selectors for locating offer data in a listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector for product containers
    #[serde(default = "defaults::product_selector")]
    pub product: String,

    /// Selector for the offers element nested in a product container
    #[serde(default = "defaults::offers_selector")]
    pub offers: String,

    /// Selector for the element carrying the raw offer text
    #[serde(default = "defaults::blob_selector")]
    pub blob: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product: defaults::product_selector(),
            offers: defaults::offers_selector(),
            blob: defaults::blob_selector(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the result file is written to
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    /// Result file name prefix; full name is `<prefix>_<color>_<rarity>.csv`
    #[serde(default = "defaults::file_prefix")]
    pub file_prefix: String,

    /// Also write a JSON run report next to the CSV
    #[serde(default = "defaults::write_report")]
    pub write_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            file_prefix: defaults::file_prefix(),
            write_report: defaults::write_report(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level printed: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Print per-page progress lines
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_progress: defaults::show_progress(),
        }
    }
}

mod defaults {
    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; cardscout/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Retry defaults: one retry after the initial attempt
    pub fn max_attempts() -> u32 {
        2
    }
    pub fn backoff_ms() -> u64 {
        500
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://shop.tcgplayer.com/magic".into()
    }
    pub fn max_page() -> u32 {
        1000
    }

    // Selector defaults
    pub fn product_selector() -> String {
        "div.product".into()
    }
    pub fn offers_selector() -> String {
        "div.product__offers".into()
    }
    pub fn blob_selector() -> String {
        "script".into()
    }

    // Output defaults
    pub fn output_dir() -> String {
        ".".into()
    }
    pub fn file_prefix() -> String {
        "foundcards".into()
    }
    pub fn write_report() -> bool {
        true
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_progress() -> bool {
        true
    }
}
