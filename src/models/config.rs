//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Category tags to crawl, in order
    #[serde(default = "defaults::categories")]
    pub categories: Vec<String>,

    /// What to do when the persisted index cannot be parsed
    #[serde(default)]
    pub load_policy: LoadPolicy,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Output layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Summary page settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Static-site export settings
    #[serde(default)]
    pub export: ExportConfig,
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
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.batch_size == 0 {
            return Err(AppError::validation("crawler.batch_size must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.listing_show == 0 {
            return Err(AppError::validation("crawler.listing_show must be > 0"));
        }
        if self.pagination.page_size == 0 {
            return Err(AppError::validation("pagination.page_size must be > 0"));
        }
        if self.categories.is_empty() {
            return Err(AppError::validation("No categories defined"));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::validation("Blank category in category list"));
        }
        Ok(())
    }

    /// Read a category list file: one tag per line, blank lines skipped.
    pub fn load_category_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::config(format!(
                "Category file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Path of the index document.
    pub fn index_path(&self) -> PathBuf {
        Path::new(&self.paths.output_dir).join(&self.paths.index_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: defaults::categories(),
            load_policy: LoadPolicy::default(),
            crawler: CrawlerConfig::default(),
            paths: PathsConfig::default(),
            pagination: PaginationConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Policy applied when `index.json` exists but is unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Warn and start from an empty index
    #[default]
    Fallback,
    /// Abort the run
    FailFast,
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Pause between categories in seconds
    #[serde(default = "defaults::delay")]
    pub delay_secs: u64,

    /// Base URL of the category listing pages
    #[serde(default = "defaults::listing_base_url")]
    pub listing_base_url: String,

    /// Base URL of the metadata query API
    #[serde(default = "defaults::api_base_url")]
    pub api_base_url: String,

    /// Number of entries requested from a listing page
    #[serde(default = "defaults::listing_show")]
    pub listing_show: usize,

    /// Identifiers per metadata request
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Maximum concurrent metadata requests within a category
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            delay_secs: defaults::delay(),
            listing_base_url: defaults::listing_base_url(),
            api_base_url: defaults::api_base_url(),
            listing_show: defaults::listing_show(),
            batch_size: defaults::batch_size(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Crawl output layout, relative to `output_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    #[serde(default = "defaults::index_file")]
    pub index_file: String,

    #[serde(default = "defaults::records_dir")]
    pub records_dir: String,

    #[serde(default = "defaults::pages_dir")]
    pub pages_dir: String,

    #[serde(default = "defaults::stats_file")]
    pub stats_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            index_file: defaults::index_file(),
            records_dir: defaults::records_dir(),
            pages_dir: defaults::pages_dir(),
            stats_file: defaults::stats_file(),
        }
    }
}

/// Summary page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Summaries per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
        }
    }
}

/// Static-site export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory of the generated site content
    #[serde(default = "defaults::site_dir")]
    pub site_dir: String,

    /// Highlighted posts per category
    #[serde(default = "defaults::highlights")]
    pub highlights: usize,

    /// Only export categories starting with one of these (case-insensitive).
    /// Empty exports everything.
    #[serde(default = "defaults::category_prefixes")]
    pub category_prefixes: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            site_dir: defaults::site_dir(),
            highlights: defaults::highlights(),
            category_prefixes: defaults::category_prefixes(),
        }
    }
}

mod defaults {
    pub fn categories() -> Vec<String> {
        vec!["cs.AI".into(), "cs.CL".into(), "cs.CV".into(), "cs.LG".into()]
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; paperdex/1.0)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn delay() -> u64 {
        5
    }
    pub fn listing_base_url() -> String {
        "https://arxiv.org".into()
    }
    pub fn api_base_url() -> String {
        "https://export.arxiv.org".into()
    }
    pub fn listing_show() -> usize {
        2000
    }
    pub fn batch_size() -> usize {
        100
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Path defaults
    pub fn output_dir() -> String {
        "data".into()
    }
    pub fn index_file() -> String {
        "index.json".into()
    }
    pub fn records_dir() -> String {
        "papers".into()
    }
    pub fn pages_dir() -> String {
        "subjects".into()
    }
    pub fn stats_file() -> String {
        "stats.json".into()
    }

    pub fn page_size() -> usize {
        100
    }

    // Export defaults
    pub fn site_dir() -> String {
        "hexo_site".into()
    }
    pub fn highlights() -> usize {
        5
    }
    pub fn category_prefixes() -> Vec<String> {
        vec!["cs.".into(), "eess.".into()]
    }
}
