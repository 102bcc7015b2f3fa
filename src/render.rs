//! Static HTML rendering
//!
//! The page is regenerated in full from the store each cycle — never
//! patched. Given the same store content and stock order the output is
//! byte-identical, so it carries no wall-clock timestamp of its own; the
//! per-item crawl times in the store are the only temporal marks.

use anyhow::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::BTreeMap;
use tracing::info;

use crate::config::{Config, StockConfig};
use crate::error::WatchError;
use crate::store::{NewsItem, NewsStore};

const STYLE: &str = r#"
body { font-family: Arial, "Microsoft YaHei", sans-serif; margin: 0; background: #f5f5f5; }
.container { display: flex; max-width: 1200px; margin: 0 auto; min-height: 100vh; }
.sidebar { width: 240px; background: #2c3e50; color: #fff; padding: 20px 0; }
.sidebar h2 { text-align: center; margin: 0 0 16px; }
.industry-title { padding: 8px 20px; background: #34495e; font-weight: bold; }
.sidebar ul { list-style: none; margin: 0; padding: 0; }
.sidebar li a { display: block; padding: 8px 20px 8px 30px; color: #fff; text-decoration: none; }
.sidebar li a:hover { background: #3498db; }
.sidebar .count { float: right; color: #bdc3c7; }
.content { flex: 1; padding: 20px; }
.header { background: #2c3e50; color: #fff; padding: 20px; border-radius: 5px; margin-bottom: 20px; }
.header h1 { margin: 0; }
.stock-section { background: #fff; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,.1); margin-bottom: 20px; overflow: hidden; }
.stock-header { background: #3498db; color: #fff; padding: 10px 20px; display: flex; justify-content: space-between; align-items: center; }
.stock-header h2 { margin: 0; font-size: 18px; }
.stock-link { margin: 10px 20px; }
.news-list { list-style: none; margin: 0; padding: 0; }
.news-item { padding: 12px 20px; border-bottom: 1px solid #eee; }
.news-item:last-child { border-bottom: none; }
.news-title { margin: 0 0 4px; font-size: 15px; }
.news-title a { color: #2c3e50; text-decoration: none; }
.news-title a:hover { text-decoration: underline; }
.news-meta { color: #7f8c8d; font-size: 12px; }
.news-meta span { margin-right: 14px; }
.no-news { padding: 20px; text-align: center; color: #7f8c8d; }
.footer { text-align: center; color: #7f8c8d; font-size: 12px; margin: 20px 0; }
"#;

/// Render the full page from the store.
///
/// Stocks appear in configuration order; each list shows the most recent
/// items first, capped at the configured display limit.
pub fn render_page(config: &Config, store: &NewsStore) -> String {
    let mut page = String::with_capacity(16 * 1024);

    page.push_str("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n");
    page.push_str("<meta charset=\"UTF-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    page.push_str("<title>股票最新资讯</title>\n");
    page.push_str("<style>");
    page.push_str(STYLE);
    page.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");

    render_sidebar(&mut page, config, store);

    page.push_str("<main class=\"content\">\n");
    page.push_str("<div class=\"header\"><h1>股票最新资讯</h1></div>\n");
    for stock in &config.stocks {
        render_stock_section(&mut page, stock, store.items_for(&stock.code), config.display_limit());
    }
    page.push_str("<div class=\"footer\">数据来源: 东方财富股吧</div>\n");
    page.push_str("</main>\n</div>\n</body>\n</html>\n");

    page
}

/// Write the rendered page to the configured output path.
///
/// Writes a sibling temp file first and renames it into place; a failed
/// render or write leaves the previous page untouched.
pub fn write_page(config: &Config, store: &NewsStore) -> Result<()> {
    let page = render_page(config, store);
    let path = &config.output_file;

    let write = || -> Result<()> {
        let tmp = path.with_extension("html.tmp");
        std::fs::write(&tmp, &page)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    };
    write().map_err(|e| WatchError::Render(format!("{:?}: {}", path, e)))?;

    info!(?path, bytes = page.len(), "output page written");
    Ok(())
}

fn render_sidebar(page: &mut String, config: &Config, store: &NewsStore) {
    // Group by industry, "其他" for unlabelled stocks; BTreeMap keeps the
    // group order stable between cycles.
    let mut industries: BTreeMap<&str, Vec<&StockConfig>> = BTreeMap::new();
    for stock in &config.stocks {
        industries
            .entry(stock.industry.as_deref().unwrap_or("其他"))
            .or_default()
            .push(stock);
    }

    page.push_str("<nav class=\"sidebar\">\n<h2>股票资讯</h2>\n");
    for (industry, mut stocks) in industries {
        stocks.sort_by(|a, b| a.name.cmp(&b.name));

        page.push_str("<div class=\"industry-title\">");
        page.push_str(&encode_text(industry));
        page.push_str("</div>\n<ul>\n");
        for stock in stocks {
            let count = store.items_for(&stock.code).len();
            page.push_str(&format!(
                "<li><a href=\"#stock-{code}\">{name} ({code}) <span class=\"count\">{count}</span></a></li>\n",
                code = encode_double_quoted_attribute(&stock.code),
                name = encode_text(&stock.name),
                count = count,
            ));
        }
        page.push_str("</ul>\n");
    }
    page.push_str("</nav>\n");
}

fn render_stock_section(page: &mut String, stock: &StockConfig, items: &[NewsItem], limit: usize) {
    page.push_str(&format!(
        "<section id=\"stock-{}\" class=\"stock-section\">\n",
        encode_double_quoted_attribute(&stock.code)
    ));
    page.push_str(&format!(
        "<div class=\"stock-header\"><h2>{} ({})</h2><span>共 {} 条资讯</span></div>\n",
        encode_text(&stock.name),
        encode_text(&stock.code),
        items.len(),
    ));
    page.push_str(&format!(
        "<p class=\"stock-link\"><a href=\"{}\" target=\"_blank\">前往股吧查看 {} 的更多讨论 »</a></p>\n",
        encode_double_quoted_attribute(&stock.board_url()),
        encode_text(&stock.name),
    ));

    if items.is_empty() {
        page.push_str("<p class=\"no-news\">暂无资讯</p>\n");
    } else {
        page.push_str("<ul class=\"news-list\">\n");
        // Store order is oldest-first; show newest first.
        for item in items.iter().rev().take(limit) {
            render_item(page, item);
        }
        page.push_str("</ul>\n");
    }
    page.push_str("</section>\n");
}

fn render_item(page: &mut String, item: &NewsItem) {
    page.push_str("<li class=\"news-item\">\n");
    page.push_str(&format!(
        "<h3 class=\"news-title\"><a href=\"{}\" target=\"_blank\">{}</a></h3>\n",
        encode_double_quoted_attribute(&item.link),
        encode_text(&item.title),
    ));

    let mut meta = Vec::new();
    if let Some(time) = &item.publish_time {
        meta.push(format!("发布 {}", encode_text(time)));
    }
    if let Some(author) = &item.author {
        meta.push(format!("作者 {}", encode_text(author)));
    }
    if let Some(reads) = &item.read_count {
        meta.push(format!("阅读 {}", encode_text(reads)));
    }
    if let Some(comments) = &item.comment_count {
        meta.push(format!("评论 {}", encode_text(comments)));
    }
    if let Some(crawled) = &item.crawled_at {
        meta.push(format!("抓取 {}", encode_text(crawled)));
    }
    if !meta.is_empty() {
        page.push_str("<div class=\"news-meta\">");
        for entry in meta {
            page.push_str("<span>");
            page.push_str(&entry);
            page.push_str("</span>");
        }
        page.push_str("</div>\n");
    }
    page.push_str("</li>\n");
}
