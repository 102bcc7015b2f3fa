//! Configuration loading
//!
//! The watcher reads a single JSON config file at startup. A malformed or
//! missing config is fatal; everything else in the pipeline degrades
//! per stock. Filter keywords can live inline, in a separate keywords
//! file, or both (the lists are merged).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::WatchError;

/// Board URL used when a stock entry does not carry an explicit `url`.
pub const BOARD_URL_TEMPLATE: &str = "https://guba.eastmoney.com/list,{code},1,f.html";

/// Base used to absolutize relative links found on board pages.
pub const BOARD_BASE_URL: &str = "https://guba.eastmoney.com";

fn default_news_link_prefix() -> String {
    // The boards mix posts, ads and quote rows; only the /news namespace
    // carries actual articles.
    "https://guba.eastmoney.com/news".to_string()
}

fn default_interval_minutes() -> u64 {
    60
}

fn default_max_news_per_stock() -> usize {
    100
}

fn default_output_file() -> PathBuf {
    PathBuf::from("stock_news.html")
}

fn default_store_file() -> PathBuf {
    PathBuf::from("news_data.json")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_request_delay_secs() -> u64 {
    2
}

/// One watched stock
#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    pub name: String,
    pub code: String,
    /// Board page override; defaults to [`BOARD_URL_TEMPLATE`] with `code`
    #[serde(default)]
    pub url: Option<String>,
    /// Optional grouping label for the rendered page's navigation
    #[serde(default)]
    pub industry: Option<String>,
}

impl StockConfig {
    /// Resolve the board page URL for this stock
    pub fn board_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => BOARD_URL_TEMPLATE.replace("{code}", &self.code),
        }
    }
}

/// Fetch strategy selection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FetcherConfig {
    /// Plain HTTP GET against the board page
    #[default]
    Http,
    /// Firecrawl-style extraction service (POST, bearer auth)
    ExtractApi {
        api_url: String,
        #[serde(default)]
        api_key: Option<String>,
    },
}

/// Top-level watcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stocks: Vec<StockConfig>,

    #[serde(default = "default_interval_minutes")]
    pub update_interval_minutes: u64,

    #[serde(default = "default_max_news_per_stock")]
    pub max_news_per_stock: usize,

    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    #[serde(default = "default_store_file")]
    pub store_file: PathBuf,

    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Politeness pause between consecutive stock fetches
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,

    /// Titles containing any of these substrings are dropped
    #[serde(default)]
    pub filter_keywords: Vec<String>,

    /// Optional `{"filter_keywords": [...]}` document merged into the list
    #[serde(default)]
    pub filter_keywords_file: Option<PathBuf>,

    /// Only links under this prefix are kept; empty string disables the check
    #[serde(default = "default_news_link_prefix")]
    pub news_link_prefix: String,

    /// Renderer display cap per stock; defaults to `max_news_per_stock`
    #[serde(default)]
    pub display_news_per_stock: Option<usize>,
}

/// Shape of the standalone keywords file
#[derive(Debug, Deserialize)]
struct KeywordsFile {
    #[serde(default)]
    filter_keywords: Vec<String>,
}

impl Config {
    /// Load and validate configuration from a JSON file.
    ///
    /// Also merges the keywords file, if one is configured. Any failure
    /// here is fatal to startup.
    pub fn load(path: &Path) -> Result<Config> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;

        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {:?}", path))?;

        config.validate()?;
        config.merge_keyword_file()?;

        info!(
            stocks = config.stocks.len(),
            interval_minutes = config.update_interval_minutes,
            keywords = config.filter_keywords.len(),
            "configuration loaded"
        );
        for stock in &config.stocks {
            info!(
                "watching {} ({}) at {}",
                stock.name,
                stock.code,
                stock.board_url()
            );
        }

        Ok(config)
    }

    /// Effective per-stock display cap for the renderer
    pub fn display_limit(&self) -> usize {
        self.display_news_per_stock
            .unwrap_or(self.max_news_per_stock)
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(WatchError::Config(reason).into());

        if self.stocks.is_empty() {
            return fail("no stocks configured".to_string());
        }
        if self.update_interval_minutes == 0 {
            return fail("update_interval_minutes must be at least 1".to_string());
        }
        if self.max_news_per_stock == 0 {
            return fail("max_news_per_stock must be at least 1".to_string());
        }
        for stock in &self.stocks {
            if stock.code.trim().is_empty() {
                return fail(format!("stock {:?} has an empty code", stock.name));
            }
        }
        Ok(())
    }

    fn merge_keyword_file(&mut self) -> Result<()> {
        let Some(path) = self.filter_keywords_file.clone() else {
            return Ok(());
        };

        if !path.exists() {
            warn!(?path, "filter keywords file not found, using inline list only");
            return Ok(());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read keywords file {:?}", path))?;
        let parsed: KeywordsFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse keywords file {:?}", path))?;

        info!(
            count = parsed.filter_keywords.len(),
            ?path,
            "merged filter keywords file"
        );
        self.filter_keywords.extend(parsed.filter_keywords);
        Ok(())
    }
}
