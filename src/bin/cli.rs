//! craigwatch CLI
//!
//! Polls every feed in a feed-list file once, records new listings in the
//! store and optionally mails a digest of them.

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use craigwatch::{
    error::Result,
    models::{Config, FeedList},
    pipeline::{self, NotifyTarget, WatchContext},
    services::{HtmlParser, SendmailNotifier},
    storage::LocalStorage,
    utils::http::HttpFetcher,
};

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG: &str = "config.toml";

/// craigwatch - Classified listing watcher
#[derive(Parser, Debug)]
#[command(
    name = "craigwatch",
    version,
    about = "Records never-before-seen classified listings from search feeds"
)]
struct Cli {
    /// File with one search-results URL per line
    feeds: PathBuf,

    /// Address to mail new listings to
    recipient: Option<String>,

    /// Path to the TOML configuration file [default: config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listing store file (overrides store.path)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Reject listings mentioning the configured date markers
    #[arg(long)]
    date_filter: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Parse arguments, exiting with status 1 on usage errors.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        // --help and --version
        Err(e) => e.exit(),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_or_default(path),
        None => Config::load_if_present(DEFAULT_CONFIG),
    };
    if let Some(store) = cli.store {
        config.store.path = store;
    }
    if cli.date_filter {
        config.filter.date_filter = true;
    }
    config.validate()?;

    let feeds = FeedList::load(&cli.feeds).inspect_err(|e| {
        log::error!("Failed to read feed list {}: {}", cli.feeds.display(), e);
    })?;
    if feeds.is_empty() {
        log::warn!("No feeds listed in {}", cli.feeds.display());
    }

    let fetcher = HttpFetcher::from_config(&config.crawler)?;
    let parser = HtmlParser::new(config.parser.clone());
    let storage = LocalStorage::new(&config.store.path);
    let notifier = SendmailNotifier::from_config(&config.notify);
    let notify = cli.recipient.as_deref().map(|recipient| NotifyTarget {
        notifier: &notifier,
        recipient,
    });

    let ctx = WatchContext {
        config: &config,
        fetcher: &fetcher,
        parser: &parser,
        store: &storage,
        notify,
        today: Local::now().date_naive(),
    };

    let summary = pipeline::run_watch(&ctx, &feeds).await.inspect_err(|e| {
        log::error!("Run failed: {}", e);
    })?;

    log::info!(
        "Done! {} new listings, {} listings known",
        summary.accepted().len(),
        summary.history_len
    );

    Ok(())
}
