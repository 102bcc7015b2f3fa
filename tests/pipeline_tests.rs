//! Integration tests for the crawl cycle
//!
//! These drive full cycles against canned board pages — no network — and
//! verify the pipeline end to end:
//! - noise filtering and first-cycle ingestion
//! - dedup across identical cycles
//! - per-stock failure isolation
//! - trimming to the configured cap
//! - save/render failure recovery

use gubanews::config::Config;
use gubanews::cycle::run_cycle;
use gubanews::fetch::Fetcher;
use gubanews::store::NewsStore;
use tempfile::TempDir;

/// Build a board page in the classic `div.articleh` layout
fn board_html(entries: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for (title, href) in entries {
        html.push_str(&format!(
            r#"<div class="articleh"><span class="l3"><a href="{}">{}</a></span><span class="l6">08-07 09:00</span></div>"#,
            href, title
        ));
    }
    html.push_str("</body></html>");
    html
}

/// Config with store/output inside the temp dir and explicit board urls
fn test_config(dir: &TempDir, stocks: &[(&str, &str, &str)], max: usize) -> Config {
    let stocks_json: Vec<String> = stocks
        .iter()
        .map(|(name, code, url)| {
            format!(
                r#"{{"name": {}, "code": {}, "url": {}}}"#,
                serde_json::to_string(name).unwrap(),
                serde_json::to_string(code).unwrap(),
                serde_json::to_string(url).unwrap(),
            )
        })
        .collect();

    let json = format!(
        r#"{{
            "stocks": [{}],
            "max_news_per_stock": {},
            "request_delay_secs": 0,
            "store_file": {},
            "output_file": {}
        }}"#,
        stocks_json.join(","),
        max,
        serde_json::to_string(dir.path().join("news_data.json").to_str().unwrap()).unwrap(),
        serde_json::to_string(dir.path().join("stock_news.html").to_str().unwrap()).unwrap(),
    );
    serde_json::from_str(&json).expect("test config parses")
}

fn read_output(config: &Config) -> String {
    std::fs::read_to_string(&config.output_file).expect("output page exists")
}

#[tokio::test]
async fn first_cycle_filters_noise_and_renders_the_rest() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[("示例", "000001", "http://board.local/000001")], 10);

    let page = board_html(&[
        ("示例 10.00 +0.5%", "/news,000001,1.html"),
        ("示例公司发布公告", "/news,000001,2.html"),
        ("", "/news,000001,3.html"),
    ]);
    let fetcher = Fetcher::canned([("http://board.local/000001", page)]);

    let mut store = NewsStore::load(&config.store_file);
    let summary = run_cycle(&config, &fetcher, &mut store).await;

    assert_eq!(summary.new_items, 1);
    assert_eq!(summary.stocks_ok, 1);
    assert!(summary.store_saved);
    assert!(summary.page_written);

    let items = store.items_for("000001");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "示例公司发布公告");
    assert_eq!(
        items[0].link,
        "https://guba.eastmoney.com/news,000001,2.html"
    );

    let html = read_output(&config);
    assert_eq!(html.matches("示例公司发布公告").count(), 1);
    assert!(!html.contains("+0.5%"));
}

#[tokio::test]
async fn second_identical_cycle_adds_nothing_and_page_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[("示例", "000001", "http://board.local/000001")], 10);

    let page = board_html(&[("示例公司发布公告", "/news,000001,2.html")]);
    let fetcher = Fetcher::canned([("http://board.local/000001", page)]);

    let mut store = NewsStore::load(&config.store_file);
    run_cycle(&config, &fetcher, &mut store).await;
    let first_html = read_output(&config);

    let summary = run_cycle(&config, &fetcher, &mut store).await;
    assert_eq!(summary.new_items, 0);
    assert_eq!(store.items_for("000001").len(), 1);
    assert_eq!(read_output(&config), first_html);
}

#[tokio::test]
async fn one_failing_stock_does_not_block_the_others() {
    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        &[
            ("甲股", "000001", "http://board.local/000001"),
            ("乙股", "600000", "http://board.local/600000"),
        ],
        10,
    );

    // Cycle 1: both boards respond.
    let fetcher = Fetcher::canned([
        (
            "http://board.local/000001",
            board_html(&[("甲股旧公告", "/news,000001,1.html")]),
        ),
        (
            "http://board.local/600000",
            board_html(&[("乙股旧公告", "/news,600000,1.html")]),
        ),
    ]);
    let mut store = NewsStore::load(&config.store_file);
    run_cycle(&config, &fetcher, &mut store).await;

    // Cycle 2: 甲股's board is unreachable, 乙股 has a new post.
    let fetcher = Fetcher::canned([(
        "http://board.local/600000",
        board_html(&[
            ("乙股旧公告", "/news,600000,1.html"),
            ("乙股重大事项", "/news,600000,2.html"),
        ]),
    )]);
    let summary = run_cycle(&config, &fetcher, &mut store).await;

    assert_eq!(summary.stocks_failed, 1);
    assert_eq!(summary.stocks_ok, 1);
    assert_eq!(summary.new_items, 1);

    // 甲股 keeps its previous data; 乙股 got the update; the page has both.
    assert_eq!(store.items_for("000001").len(), 1);
    assert_eq!(store.items_for("600000").len(), 2);
    let html = read_output(&config);
    assert!(html.contains("甲股旧公告"));
    assert!(html.contains("乙股重大事项"));
}

#[tokio::test]
async fn store_never_exceeds_cap_and_keeps_newest() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[("示例", "000001", "http://board.local/000001")], 2);

    let fetcher = Fetcher::canned([(
        "http://board.local/000001",
        board_html(&[
            ("一号公告", "/news,000001,1.html"),
            ("二号公告", "/news,000001,2.html"),
        ]),
    )]);
    let mut store = NewsStore::load(&config.store_file);
    run_cycle(&config, &fetcher, &mut store).await;
    assert_eq!(store.items_for("000001").len(), 2);

    let fetcher = Fetcher::canned([(
        "http://board.local/000001",
        board_html(&[
            ("三号公告", "/news,000001,3.html"),
            ("四号公告", "/news,000001,4.html"),
            ("五号公告", "/news,000001,5.html"),
        ]),
    )]);
    let summary = run_cycle(&config, &fetcher, &mut store).await;
    assert_eq!(summary.new_items, 3);

    let titles: Vec<&str> = store
        .items_for("000001")
        .iter()
        .map(|i| i.title.as_str())
        .collect();
    assert_eq!(titles, vec!["四号公告", "五号公告"]);
}

#[tokio::test]
async fn unparsable_page_counts_as_a_failed_stock() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[("示例", "000001", "http://board.local/000001")], 10);

    let fetcher = Fetcher::canned([("http://board.local/000001", "<html><body>维护中</body></html>")]);
    let mut store = NewsStore::load(&config.store_file);
    let summary = run_cycle(&config, &fetcher, &mut store).await;

    assert_eq!(summary.stocks_failed, 1);
    assert_eq!(summary.new_items, 0);
    assert_eq!(store.total_items(), 0);
    // The empty page still renders.
    assert!(summary.page_written);
    assert!(read_output(&config).contains("暂无资讯"));
}

#[tokio::test]
async fn failed_save_keeps_state_and_still_renders() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir, &[("示例", "000001", "http://board.local/000001")], 10);
    // Point the store into a directory that does not exist.
    config.store_file = dir.path().join("missing_subdir").join("news_data.json");

    let fetcher = Fetcher::canned([(
        "http://board.local/000001",
        board_html(&[("示例公司发布公告", "/news,000001,1.html")]),
    )]);
    let mut store = NewsStore::load(&config.store_file);
    let summary = run_cycle(&config, &fetcher, &mut store).await;

    assert!(!summary.store_saved);
    assert!(summary.page_written);
    // In-memory state is retained for the next attempt.
    assert_eq!(store.items_for("000001").len(), 1);
}

#[tokio::test]
async fn failed_render_leaves_previous_page_in_place() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir, &[("示例", "000001", "http://board.local/000001")], 10);

    let fetcher = Fetcher::canned([(
        "http://board.local/000001",
        board_html(&[("示例公司发布公告", "/news,000001,1.html")]),
    )]);
    let mut store = NewsStore::load(&config.store_file);
    run_cycle(&config, &fetcher, &mut store).await;
    let first_html = read_output(&config);

    // Make the output path unwritable for the second cycle.
    let good_output = config.output_file.clone();
    config.output_file = dir.path().join("missing_subdir").join("page.html");
    let summary = run_cycle(&config, &fetcher, &mut store).await;

    assert!(!summary.page_written);
    assert!(summary.store_saved);
    assert_eq!(std::fs::read_to_string(good_output).unwrap(), first_html);
}
