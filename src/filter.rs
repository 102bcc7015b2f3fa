//! Title noise filtering
//!
//! The boards interleave real posts with rows that are nothing but a live
//! quote ("东方财富 12.34 +1.2%"). Those rows, empty titles, and titles
//! containing operator-configured keywords are dropped before dedup. The
//! predicate is pure so it can be tested in isolation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::store::NewsItem;

/// A title that is only "name-or-code, price, signed percent" is a quote
/// row, not a post. Titles merely containing a quote inside prose survive.
static QUOTE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\S+\s+\d+(?:\.\d+)?\s+[+-]?\d+(?:\.\d+)?%$").unwrap()
});

/// Configured title filter
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    keywords: Vec<String>,
}

impl TitleFilter {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.filter_keywords.clone())
    }

    /// Should this title be discarded?
    pub fn is_noise(&self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return true;
        }
        if QUOTE_ROW.is_match(title) {
            return true;
        }
        self.keywords.iter().any(|kw| title.contains(kw.as_str()))
    }

    /// Drop noise items, preserving order
    pub fn apply(&self, candidates: Vec<NewsItem>) -> Vec<NewsItem> {
        candidates
            .into_iter()
            .filter(|item| !self.is_noise(&item.title))
            .collect()
    }
}
