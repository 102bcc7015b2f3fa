use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gubanews")]
#[command(version, about = "Watch guba stock boards and publish a static news digest")]
#[command(
    long_about = "Polls the configured eastmoney guba discussion boards on a schedule, filters \
out quote-noise titles, deduplicates against previously seen posts, and regenerates a static \
HTML digest after every pass."
)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scheduled watcher until terminated (default)
    Run,

    /// Run a single crawl cycle, then exit
    Once,

    /// Regenerate the HTML page from the saved store without fetching
    Render,
}
