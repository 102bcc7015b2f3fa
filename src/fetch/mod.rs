//! Page fetching
//!
//! One seam, interchangeable strategies: a plain HTTP client for boards
//! that serve their markup directly, and an extraction-service client for
//! boards that need a rendering proxy. The strategy is chosen by
//! configuration, so the rest of the pipeline never knows which one runs.
//! The `Canned` variant hands back pre-recorded pages, which is how the
//! test suite drives full cycles without a network.

pub mod extract_api;
pub mod http;

pub use extract_api::ExtractApiFetcher;
pub use http::HttpFetcher;

use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{Config, FetcherConfig};
use crate::error::WatchError;

/// A configured fetch strategy
pub enum Fetcher {
    Http(HttpFetcher),
    ExtractApi(ExtractApiFetcher),
    /// Pre-recorded url -> body pages; unknown urls fail like a dead host
    Canned(HashMap<String, String>),
}

impl Fetcher {
    /// Build the strategy the config asks for
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        match &config.fetcher {
            FetcherConfig::Http => Ok(Self::Http(HttpFetcher::new(timeout)?)),
            FetcherConfig::ExtractApi { api_url, api_key } => Ok(Self::ExtractApi(
                ExtractApiFetcher::new(api_url.clone(), api_key.clone(), timeout)?,
            )),
        }
    }

    /// Canned pages for tests and offline replays
    pub fn canned<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Canned(
            pages
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Fetch the raw document behind `url`
    pub async fn fetch(&self, url: &str) -> Result<String> {
        match self {
            Self::Http(fetcher) => fetcher.fetch(url).await,
            Self::ExtractApi(fetcher) => fetcher.fetch(url).await,
            Self::Canned(pages) => pages.get(url).cloned().ok_or_else(|| {
                WatchError::Fetch {
                    url: url.to_string(),
                    reason: "no canned page for url".to_string(),
                }
                .into()
            }),
        }
    }
}
