//! Error handling for the guba watcher
//!
//! Defines the per-stage error kinds and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error kinds for the crawl pipeline.
///
/// Only `Config` is fatal; every other kind is recovered per stock or per
/// cycle and surfaces as a logged warning.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("config error: {0}")]
    Config(String),

    #[error("fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("parse error for {stock_code}: {reason}")]
    Parse { stock_code: String, reason: String },

    #[error("store load error: {0}")]
    StoreLoad(String),

    #[error("store save error: {0}")]
    StoreSave(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for watcher operations
pub type Result<T> = anyhow::Result<T>;
