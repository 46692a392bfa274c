use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use feedscout::config::Config;
use feedscout::orchestrator::{self, RunOptions};
use feedscout::reader::ReaderClient;

#[derive(Parser, Debug)]
#[command(
    name = "feedscout",
    about = "Find and subscribe to RSS feeds found on a URL, and on URLs mentioned there"
)]
struct Args {
    /// Page URL to start feed discovery from
    page_url: String,

    /// RSS reader category name to assign new feeds to
    #[arg(short, long)]
    category: String,

    /// Enable debug-level logging and simulate subscriptions
    #[arg(short, long)]
    debug: bool,

    /// Delete all feeds within the category before subscribing to new feeds
    #[arg(short = 'r', long)]
    clear_category_feeds: bool,

    /// Probe only the page URL's own domain instead of traversing links.
    /// Pass =false to force traversal when the config enables single URL
    /// mode by default.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    single_url_mode: Option<bool>,

    /// Maximum number of domains probed concurrently in traversal mode
    #[arg(long)]
    concurrency: Option<usize>,
}

/// Config file location (~/.config/feedscout/config.toml), when a home
/// directory is available.
fn config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("feedscout")
            .join("config.toml")
    })
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "feedscout=debug"
    } else {
        "feedscout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    // A .env in the working directory supplies reader credentials in dev
    dotenvy::dotenv().ok();

    let config = Config::load(config_path().as_deref()).context("failed to load configuration")?;
    let reader = ReaderClient::new(&config.reader_endpoint, config.reader_api_key.clone())
        .context("failed to create reader client")?;

    let opts = RunOptions {
        page_url: args.page_url,
        category: args.category,
        debug: args.debug,
        clear_category_feeds: args.clear_category_feeds,
        single_url_mode: args.single_url_mode,
        concurrency: args.concurrency,
    };

    let count = orchestrator::run(&opts, &config, &reader).await?;
    println!("Subscribed to {count} feeds");
    Ok(())
}
