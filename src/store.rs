//! Persisted news store
//!
//! A single JSON file mapping stock code to the ordered list of items seen
//! so far. Loaded once at startup, held in memory for the process
//! lifetime, rewritten after every cycle. The sequence for each stock is
//! append-ordered: oldest first, newest last.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::WatchError;

/// One extracted news/post entry.
///
/// Identity is the link; the title stands in when a link is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,

    #[serde(default)]
    pub stock_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_count: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<String>,
}

impl NewsItem {
    /// Dedup key: the link, or the title for linkless entries
    pub fn identity(&self) -> &str {
        if self.link.is_empty() {
            &self.title
        } else {
            &self.link
        }
    }
}

/// In-memory news store backed by a JSON file
#[derive(Debug)]
pub struct NewsStore {
    path: PathBuf,
    items: BTreeMap<String, Vec<NewsItem>>,
}

impl NewsStore {
    /// Create an empty store that will persist to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: BTreeMap::new(),
        }
    }

    /// Load the store from disk.
    ///
    /// A missing file starts a fresh store; a corrupt file is reported and
    /// also starts fresh, so a bad write can never wedge the scheduler.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if !path.exists() {
            info!(?path, "no saved news data found, starting with empty store");
            return Self::empty(path);
        }

        let items = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| {
                serde_json::from_str::<BTreeMap<String, Vec<NewsItem>>>(&raw)
                    .map_err(anyhow::Error::from)
            });

        match items {
            Ok(items) => {
                let total: usize = items.values().map(Vec::len).sum();
                info!(?path, stocks = items.len(), total, "loaded saved news data");
                Self { path, items }
            }
            Err(e) => {
                let err = WatchError::StoreLoad(e.to_string());
                warn!(?path, %err, "starting with empty store");
                Self::empty(path)
            }
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items recorded for a stock, oldest first
    pub fn items_for(&self, stock_code: &str) -> &[NewsItem] {
        self.items.get(stock_code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total item count across all stocks
    pub fn total_items(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    /// Deduplicator: keep only candidates whose identity is not yet stored
    /// for this stock, preserving candidate order. Also drops duplicates
    /// within the candidate batch itself.
    pub fn filter_new(&self, stock_code: &str, candidates: Vec<NewsItem>) -> Vec<NewsItem> {
        let mut seen: HashSet<String> = self
            .items_for(stock_code)
            .iter()
            .map(|item| item.identity().to_string())
            .collect();

        candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.identity().to_string()))
            .collect()
    }

    /// Append new items for a stock, then trim the sequence to `max`
    /// entries, keeping the most recently added ones.
    pub fn merge_and_trim(&mut self, stock_code: &str, new_items: Vec<NewsItem>, max: usize) {
        if new_items.is_empty() {
            return;
        }

        let entry = self.items.entry(stock_code.to_string()).or_default();
        for item in new_items {
            debug!(stock_code, title = %item.title, "recording new item");
            entry.push(item);
        }

        if entry.len() > max {
            let excess = entry.len() - max;
            entry.drain(..excess);
        }
    }

    /// Serialize the full mapping back to disk.
    ///
    /// Writes to a sibling temp file and renames over the target, so an
    /// interrupted save never leaves a torn file behind.
    pub fn save(&self) -> Result<()> {
        let write = || -> Result<()> {
            let json = serde_json::to_string_pretty(&self.items)?;
            let tmp = self.path.with_extension("json.tmp");
            std::fs::write(&tmp, json)?;
            std::fs::rename(&tmp, &self.path)?;
            Ok(())
        };
        write().map_err(|e| WatchError::StoreSave(format!("{:?}: {}", self.path, e)))?;

        info!(path = ?self.path, total = self.total_items(), "news data saved");
        Ok(())
    }
}
