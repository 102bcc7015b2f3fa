//! Candidate extraction from board markup
//!
//! The guba boards have shipped several list layouts over time: a
//! `table.articleh` with one row per post, bare `div.articleh` blocks, and
//! a `ul.newlist` variant. The extractor probes each container pattern in
//! turn and, within an entry, probes a fallback chain for every field.
//! An entry missing its title link is skipped; a document with no
//! recognizable entries at all is a parse error (recovered upstream as
//! zero candidates).

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::{StockConfig, BOARD_BASE_URL};
use crate::error::WatchError;
use crate::store::NewsItem;

fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns.iter().map(|p| Selector::parse(p).unwrap()).collect()
}

static ENTRY_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "table.articleh tr",
        "div.articleh",
        "ul.newlist > li",
        ".listcont .articleh, .articleh_list .articleh, #mainlist .articleh",
    ])
});

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&["span.l3 a", "a.title, a.news_title, a[title]", "a"])
});

static TIME_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["span.l6", "span.time, span.date, td:last-child"]));

static READ_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.l1").unwrap());
static COMMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.l2").unwrap());
static AUTHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.l4").unwrap());

/// Posts sometimes carry their date only inside the title text
static DATE_IN_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2}|\d{2}-\d{2}|\d{2}/\d{2})").unwrap());

/// Extract candidate items from raw board markup.
///
/// `link_prefix` restricts results to the portal's news namespace; pass an
/// empty string to keep every link. `crawled_at` is stamped onto each
/// candidate so the cycle decides the timestamp, not the parser.
pub fn extract_candidates(
    html: &str,
    stock: &StockConfig,
    link_prefix: &str,
    crawled_at: &str,
) -> Result<Vec<NewsItem>> {
    let document = Html::parse_document(html);

    let entries = find_entries(&document);
    if entries.is_empty() {
        return Err(WatchError::Parse {
            stock_code: stock.code.clone(),
            reason: "no recognizable list entries in document".to_string(),
        }
        .into());
    }
    debug!(stock_code = %stock.code, entries = entries.len(), "found list entries");

    let base = Url::parse(BOARD_BASE_URL).expect("board base URL is valid");
    let mut candidates = Vec::new();

    for entry in entries {
        let Some(title_el) = select_first(entry, &TITLE_SELECTORS) else {
            debug!(stock_code = %stock.code, "entry has no title link, skipping");
            continue;
        };

        let title = element_text(title_el);
        let Some(link) = title_el
            .value()
            .attr("href")
            .and_then(|href| resolve_link(&base, href))
        else {
            debug!(stock_code = %stock.code, %title, "entry link missing or unresolvable");
            continue;
        };

        if !link_prefix.is_empty() && !link.starts_with(link_prefix) {
            debug!(stock_code = %stock.code, %link, "link outside news namespace, skipping");
            continue;
        }

        let publish_time = select_first(entry, &TIME_SELECTORS)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                DATE_IN_TITLE
                    .find(&title)
                    .map(|m| m.as_str().to_string())
            });

        candidates.push(NewsItem {
            title,
            link,
            publish_time,
            stock_code: stock.code.clone(),
            author: optional_text(entry, &AUTHOR_SELECTOR),
            read_count: optional_text(entry, &READ_SELECTOR),
            comment_count: optional_text(entry, &COMMENT_SELECTOR),
            crawled_at: Some(crawled_at.to_string()),
        });
    }

    if candidates.is_empty() {
        warn!(stock_code = %stock.code, "list entries present but none yielded a usable item");
    }
    Ok(candidates)
}

/// Probe the container patterns in order, taking the first that matches
fn find_entries(document: &Html) -> Vec<ElementRef<'_>> {
    for selector in ENTRY_SELECTORS.iter() {
        let entries: Vec<ElementRef<'_>> = document.select(selector).collect();
        if !entries.is_empty() {
            return entries;
        }
    }
    Vec::new()
}

fn select_first<'a>(entry: ElementRef<'a>, chain: &[Selector]) -> Option<ElementRef<'a>> {
    chain
        .iter()
        .find_map(|selector| entry.select(selector).next())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn optional_text(entry: ElementRef<'_>, selector: &Selector) -> Option<String> {
    entry
        .select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(|u| u.to_string())
}
