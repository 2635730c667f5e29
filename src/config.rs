//! Configuration for flashstat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome executable; falls back to the platform default when unset
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

fn default_window_width() -> u32 {
    1366
}

fn default_window_height() -> u32 {
    768
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl BrowserConfig {
    /// Chrome executable to launch
    pub fn executable_path(&self) -> String {
        if let Some(ref path) = self.executable {
            return path.clone();
        }

        if cfg!(target_os = "macos") {
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()
        } else if cfg!(target_os = "windows") {
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe".to_string()
        } else {
            "google-chrome".to_string()
        }
    }
}

/// Crawl timing and source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bounded wait for a required element on a detail page
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    /// Bounded wait for the "show more" affordance
    #[serde(default = "default_pagination_timeout_ms")]
    pub pagination_timeout_ms: u64,
    /// Bounded wait for statistic rows, whose absence is not an error
    #[serde(default = "default_statistics_timeout_ms")]
    pub statistics_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause after each "show more" click
    #[serde(default = "default_click_settle_ms")]
    pub click_settle_ms: u64,
}

fn default_base_url() -> String {
    crate::scraper::BASE_URL.to_string()
}

fn default_wait_timeout_ms() -> u64 {
    30_000
}

fn default_pagination_timeout_ms() -> u64 {
    30_000
}

fn default_statistics_timeout_ms() -> u64 {
    5_000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_click_settle_ms() -> u64 {
    500
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            wait_timeout_ms: default_wait_timeout_ms(),
            pagination_timeout_ms: default_pagination_timeout_ms(),
            statistics_timeout_ms: default_statistics_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            click_settle_ms: default_click_settle_ms(),
        }
    }
}

impl CrawlConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn pagination_timeout(&self) -> Duration {
        Duration::from_millis(self.pagination_timeout_ms)
    }

    pub fn statistics_timeout(&self) -> Duration {
        Duration::from_millis(self.statistics_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Directory for short-lived CSV files staged during a run
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/flashstat.db")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("data/tmp")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            staging_dir: default_staging_dir(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (FLASHSTAT_SERVER__PORT, etc.)
            .add_source(
                config::Environment::with_prefix("FLASHSTAT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
