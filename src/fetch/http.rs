//! Direct HTTP fetch strategy

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::WatchError;

// The boards serve a stripped page to obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Plain GET fetcher with a per-request timeout
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// GET the page and return its body text.
    ///
    /// Non-success statuses and transport failures both surface as fetch
    /// errors; the caller skips the stock for this cycle.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(%url, "requesting board page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Fetch {
                url: url.to_string(),
                reason: format!("http status {}", status),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| WatchError::Fetch {
            url: url.to_string(),
            reason: format!("failed to read body: {}", e),
        })?;

        info!(%url, bytes = body.len(), "fetched board page");
        Ok(body)
    }
}
