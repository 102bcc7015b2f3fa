//! Extraction-service fetch strategy
//!
//! Firecrawl-style scrape endpoint: POST `{url, formats}` with bearer
//! auth, get back the rendered page HTML. Used for boards that refuse a
//! plain GET.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::WatchError;

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: &'a [&'a str],
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    success: Option<bool>,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    html: Option<String>,
}

/// Client for a hosted page-extraction service
pub struct ExtractApiFetcher {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl ExtractApiFetcher {
    pub fn new(api_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build extraction API client")?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// Ask the service to scrape `url` and return the page HTML
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(%url, api = %self.api_url, "requesting page via extraction service");

        let payload = ScrapeRequest {
            url,
            formats: &["html"],
            only_main_content: true,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| WatchError::Fetch {
            url: url.to_string(),
            reason: format!("extraction service request failed: {}", e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Fetch {
                url: url.to_string(),
                reason: format!("extraction service returned http status {}", status),
            }
            .into());
        }

        let parsed: ScrapeResponse = response.json().await.map_err(|e| WatchError::Fetch {
            url: url.to_string(),
            reason: format!("failed to parse extraction service response: {}", e),
        })?;

        if parsed.success == Some(false) {
            return Err(WatchError::Fetch {
                url: url.to_string(),
                reason: parsed
                    .error
                    .unwrap_or_else(|| "extraction service reported failure".to_string()),
            }
            .into());
        }

        let html = parsed
            .data
            .and_then(|d| d.html)
            .ok_or_else(|| WatchError::Fetch {
                url: url.to_string(),
                reason: "extraction service response carried no html".to_string(),
            })?;

        info!(%url, bytes = html.len(), "fetched board page via extraction service");
        Ok(html)
    }
}
