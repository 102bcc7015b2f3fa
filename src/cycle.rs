//! One crawl cycle over all configured stocks
//!
//! Fetch, extract, filter, dedupe and merge per stock; save the store and
//! rewrite the page once at the end. A failing stock never stops the
//! others, and a failed save keeps the in-memory state for the next
//! attempt. The cycle owns no loop or timer — the scheduler in `main`
//! (or a test) drives it.

use chrono::Local;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::{Config, StockConfig};
use crate::error::Result;
use crate::extract::extract_candidates;
use crate::fetch::Fetcher;
use crate::filter::TitleFilter;
use crate::render;
use crate::store::NewsStore;

/// What one cycle did, for logs and the CLI summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub stocks_ok: usize,
    pub stocks_failed: usize,
    pub new_items: usize,
    pub store_saved: bool,
    pub page_written: bool,
}

/// Run one full cycle: every configured stock, then persist and render
pub async fn run_cycle(config: &Config, fetcher: &Fetcher, store: &mut NewsStore) -> CycleSummary {
    let filter = TitleFilter::from_config(config);
    let started = std::time::Instant::now();
    let mut summary = CycleSummary::default();

    info!(stocks = config.stocks.len(), "cycle started");

    for (index, stock) in config.stocks.iter().enumerate() {
        if index > 0 && config.request_delay_secs > 0 {
            sleep(Duration::from_secs(config.request_delay_secs)).await;
        }

        let url = stock.board_url();
        match process_stock(config, fetcher, store, &filter, stock, &url).await {
            Ok(added) => {
                summary.stocks_ok += 1;
                summary.new_items += added;
            }
            Err(e) => {
                summary.stocks_failed += 1;
                warn!(
                    stock_code = %stock.code,
                    %url,
                    error = %e,
                    "stock skipped this cycle"
                );
            }
        }
    }

    match store.save() {
        Ok(()) => summary.store_saved = true,
        Err(e) => warn!(error = %e, "store save failed, keeping in-memory state for next cycle"),
    }

    match render::write_page(config, store) {
        Ok(()) => summary.page_written = true,
        Err(e) => warn!(error = %e, "render failed, previous output page left in place"),
    }

    info!(
        new_items = summary.new_items,
        ok = summary.stocks_ok,
        failed = summary.stocks_failed,
        elapsed_secs = started.elapsed().as_secs(),
        "cycle finished"
    );
    summary
}

/// Fetch and process a single stock; returns how many new items landed
async fn process_stock(
    config: &Config,
    fetcher: &Fetcher,
    store: &mut NewsStore,
    filter: &TitleFilter,
    stock: &StockConfig,
    url: &str,
) -> Result<usize> {
    info!(stock_code = %stock.code, name = %stock.name, %url, "crawling stock board");

    let html = fetcher.fetch(url).await?;

    let crawled_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let candidates = extract_candidates(&html, stock, &config.news_link_prefix, &crawled_at)?;
    let extracted = candidates.len();

    let kept = filter.apply(candidates);
    let fresh = store.filter_new(&stock.code, kept);
    let added = fresh.len();
    store.merge_and_trim(&stock.code, fresh, config.max_news_per_stock);

    info!(
        stock_code = %stock.code,
        extracted,
        added,
        "stock processed"
    );
    Ok(added)
}
