use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use gubanews::cli::{Cli, Commands};
use gubanews::config::Config;
use gubanews::cycle::{run_cycle, CycleSummary};
use gubanews::fetch::Fetcher;
use gubanews::render;
use gubanews::store::NewsStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Malformed configuration is the one fatal error
    let config = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_scheduled(config).await,
        Commands::Once => run_once(config).await,
        Commands::Render => render_only(config),
    }
}

/// Scheduled mode: crawl immediately, then on every interval tick until
/// the process is interrupted. Cycles never overlap — the loop awaits
/// each one, and ticks missed by a slow cycle are skipped.
async fn run_scheduled(config: Config) -> Result<()> {
    let fetcher = Fetcher::from_config(&config)?;
    let mut store = NewsStore::load(&config.store_file);

    run_cycle(&config, &fetcher, &mut store).await;

    let mut ticker = interval(Duration::from_secs(config.update_interval_minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // the first tick completes immediately, already crawled above

    info!(
        minutes = config.update_interval_minutes,
        "entering schedule loop"
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&config, &fetcher, &mut store).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }
    Ok(())
}

/// Single-cycle mode for cron jobs and manual runs
async fn run_once(config: Config) -> Result<()> {
    let fetcher = Fetcher::from_config(&config)?;
    let mut store = NewsStore::load(&config.store_file);

    let summary = run_cycle(&config, &fetcher, &mut store).await;
    print_summary(&summary);
    Ok(())
}

/// Rebuild the HTML page from the saved store, no network involved
fn render_only(config: Config) -> Result<()> {
    let store = NewsStore::load(&config.store_file);
    render::write_page(&config, &store)?;
    println!(
        "{} page regenerated at {}",
        "✓".green().bold(),
        config.output_file.display()
    );
    Ok(())
}

fn print_summary(summary: &CycleSummary) {
    println!("\n{} Cycle complete!", "✓".green().bold());
    println!("  New items: {}", summary.new_items.to_string().green());
    println!("  Stocks crawled: {}", summary.stocks_ok);
    if summary.stocks_failed > 0 {
        println!(
            "  Stocks failed: {}",
            summary.stocks_failed.to_string().red()
        );
    }
    if !summary.store_saved {
        println!(
            "  {} store save failed; state kept in memory only",
            "!".yellow().bold()
        );
    }
    if !summary.page_written {
        println!(
            "  {} render failed; previous page left in place",
            "!".yellow().bold()
        );
    }
}
