//! Bilicrawl main entry point
//!
//! This is the command-line interface for the Bilicrawl comment crawler.

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bilicrawl::config::{load_config_with_hash, Config};
use bilicrawl::crawler::{CommentCrawler, CrawlOptions, PageSink};
use bilicrawl::session::FileBrowserSession;
use bilicrawl::storage::{load_checkpoint, open_store, save_checkpoint, SqliteStore, Store};
use bilicrawl::{BiliClient, CommentNode, SearchOrder};
use tracing_subscriber::EnvFilter;

/// Page size for creator upload listings
const CREATOR_PAGE_SIZE: i64 = 30;

/// Bilicrawl: a signed Bilibili web-API client and comment crawler
///
/// Bilicrawl reads public video metadata and comment threads through the
/// wbi-signed web API, authenticates with cookies captured from a real
/// browsing session, and lands every payload in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "bilicrawl")]
#[command(version = "0.1.0")]
#[command(about = "A signed Bilibili comment crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore any resume checkpoint and start from the top of the target list
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without fetching
    #[arg(long, conflicts_with = "probe")]
    dry_run: bool,

    /// Check whether the captured session is still logged in and exit
    #[arg(long, conflicts_with = "dry_run")]
    probe: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let client = build_client(&config).await?;

    if cli.probe {
        return handle_probe(&client).await;
    }

    handle_crawl(&client, &config, &config_hash, cli.fresh).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bilicrawl=info,warn"),
            1 => EnvFilter::new("bilicrawl=debug,info"),
            2 => EnvFilter::new("bilicrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the API client, attaching the captured session when configured
async fn build_client(config: &Config) -> anyhow::Result<BiliClient> {
    let mut client = BiliClient::new(
        &config.api.host,
        Duration::from_secs(config.api.timeout_seconds),
        &config.api.user_agent,
    )?;

    if let Some(path) = &config.auth.session_file {
        let session = FileBrowserSession::load(Path::new(path))
            .with_context(|| format!("failed to load session snapshot {}", path))?;
        client.attach_browser(Arc::new(session));
        client.refresh_session().await?;
        tracing::info!("Session cookies loaded from {}", path);
    } else {
        tracing::info!("No session snapshot configured, running anonymously");
    }

    Ok(client)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Bilicrawl Dry Run ===\n");

    println!("API:");
    println!("  Host: {}", config.api.host);
    println!("  Timeout: {}s", config.api.timeout_seconds);

    println!("\nCrawler:");
    println!("  Interval: {}ms", config.crawler.crawl_interval_ms);
    println!("  Max comments per video: {}", config.crawler.max_comments);
    println!("  Fetch replies: {}", config.crawler.fetch_replies);
    println!("  Reply page size: {}", config.crawler.reply_page_size);
    println!("  Resume window: {}h", config.crawler.resume_window_hours);

    println!("\nSession:");
    match &config.auth.session_file {
        Some(path) => println!("  Snapshot: {}", path),
        None => println!("  Snapshot: none (anonymous)"),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nVideos ({}):", config.targets.videos.len());
    for video in &config.targets.videos {
        println!("  - {}", video);
    }

    println!("\nCreators ({}):", config.targets.creators.len());
    for creator in &config.targets.creators {
        println!("  - {}", creator);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} videos and {} creators",
        config.targets.videos.len(),
        config.targets.creators.len()
    );
}

/// Handles the --probe mode: reports whether the session is logged in
async fn handle_probe(client: &BiliClient) -> anyhow::Result<()> {
    if client.probe_login().await {
        println!("✓ Session is logged in");
        Ok(())
    } else {
        println!("✗ Session is not logged in");
        anyhow::bail!("session is not logged in")
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    client: &BiliClient,
    config: &Config,
    config_hash: &str,
    fresh: bool,
) -> anyhow::Result<()> {
    if client.probe_login().await {
        tracing::info!("Crawling with a logged-in session");
    } else {
        tracing::warn!("Session is not logged in; some content may be withheld");
    }

    let store = open_store(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open database {}", config.output.database_path))?;
    let sink = StoreSink::new(Arc::new(Mutex::new(store)));

    let options = CrawlOptions {
        max_items: config.crawler.max_comments,
        interval: Duration::from_millis(config.crawler.crawl_interval_ms),
        fetch_replies: config.crawler.fetch_replies,
        reply_page_size: i64::from(config.crawler.reply_page_size),
        ..CrawlOptions::default()
    };
    let crawler = CommentCrawler::new(client, options);

    // Ctrl-C stops between pages instead of tearing the run down
    let interrupt = crawler.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current page");
            interrupt.cancel();
        }
    });

    crawl_videos(client, &crawler, config, &sink).await?;
    crawl_creators(client, &crawler, config, config_hash, fresh, &sink).await?;

    tracing::info!("Crawl finished: {} comments stored", sink.stored());
    Ok(())
}

/// Crawls the configured standalone videos
async fn crawl_videos(
    client: &BiliClient,
    crawler: &CommentCrawler<'_>,
    config: &Config,
    sink: &StoreSink,
) -> anyhow::Result<()> {
    let cancel = crawler.cancel_token();

    for video_id in &config.targets.videos {
        if cancel.is_cancelled() {
            tracing::info!("Stopping before video {}", video_id);
            break;
        }

        // Detail is best effort; comments are still worth crawling without it
        if let Some(detail) = fetch_detail(client, video_id).await {
            let mut store = sink.store.lock().unwrap();
            store.upsert_content(video_id, &detail)?;
        }

        if let Err(err) = crawler.crawl_video_comments(video_id, sink).await {
            tracing::warn!("Comment crawl for video {} failed: {}", video_id, err);
        }
    }

    Ok(())
}

/// Fetches video detail, downgrading failures to a warning
async fn fetch_detail(client: &BiliClient, video_id: &str) -> Option<Value> {
    let aid = match video_id.parse::<i64>() {
        Ok(aid) => aid,
        Err(_) => {
            tracing::warn!("Video id {} does not fit an i64, skipping detail", video_id);
            return None;
        }
    };

    match client.video_detail(Some(aid), None).await {
        Ok(detail) => Some(detail),
        Err(err) => {
            tracing::warn!("Video detail for {} unavailable: {}", video_id, err);
            None
        }
    }
}

/// Walks the configured creators, resuming past a fresh checkpoint
async fn crawl_creators(
    client: &BiliClient,
    crawler: &CommentCrawler<'_>,
    config: &Config,
    config_hash: &str,
    fresh: bool,
    sink: &StoreSink,
) -> anyhow::Result<()> {
    let creators = &config.targets.creators;
    if creators.is_empty() {
        return Ok(());
    }

    let start = if fresh {
        tracing::info!("Starting fresh creator crawl (ignoring any checkpoint)");
        0
    } else {
        resume_position(creators, config, config_hash, sink)
    };

    let cancel = crawler.cancel_token();
    for creator_id in &creators[start..] {
        if cancel.is_cancelled() {
            tracing::info!("Stopping before creator {}", creator_id);
            break;
        }

        // Record the position first so an interrupted run redoes this
        // creator instead of losing it
        {
            let mut store = sink.store.lock().unwrap();
            save_checkpoint(&mut *store, creator_id, config_hash)?;
        }

        if let Err(err) = crawl_creator(client, crawler, creator_id, sink).await {
            tracing::warn!("Creator {} crawl failed: {}", creator_id, err);
        }
    }

    Ok(())
}

/// Picks the creator-list index to start from, honoring a fresh checkpoint
fn resume_position(
    creators: &[String],
    config: &Config,
    config_hash: &str,
    sink: &StoreSink,
) -> usize {
    let checkpoint = {
        let store = sink.store.lock().unwrap();
        load_checkpoint(&*store)
    };

    let checkpoint = match checkpoint {
        Some(checkpoint) => checkpoint,
        None => return 0,
    };

    if !checkpoint.is_fresh(config.crawler.resume_window_hours, config_hash) {
        tracing::info!("Resume checkpoint is stale, starting from the top");
        return 0;
    }

    match creators.iter().position(|c| c == &checkpoint.creator_id) {
        Some(pos) => {
            tracing::info!(
                "Resuming creator crawl at {} ({} of {})",
                checkpoint.creator_id,
                pos + 1,
                creators.len()
            );
            pos
        }
        None => {
            tracing::warn!(
                "Checkpoint creator {} is not in the target list, starting from the top",
                checkpoint.creator_id
            );
            0
        }
    }
}

/// Stores one creator's first page of uploads and crawls their comments
async fn crawl_creator(
    client: &BiliClient,
    crawler: &CommentCrawler<'_>,
    creator_id: &str,
    sink: &StoreSink,
) -> anyhow::Result<()> {
    tracing::info!("Crawling creator {}", creator_id);

    let page = client
        .creator_videos(creator_id, 1, CREATOR_PAGE_SIZE, SearchOrder::LatestPublish)
        .await?;

    {
        let mut store = sink.store.lock().unwrap();
        store.upsert_creator(creator_id, &page)?;
    }

    let videos = page
        .pointer("/list/vlist")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    tracing::info!("Creator {} listed {} videos", creator_id, videos.len());

    let cancel = crawler.cancel_token();
    for video in &videos {
        if cancel.is_cancelled() {
            break;
        }

        let aid = match video.get("aid").and_then(Value::as_i64) {
            Some(aid) if aid > 0 => aid,
            _ => {
                tracing::warn!("Skipping a listed video without a usable aid");
                continue;
            }
        };
        let video_id = aid.to_string();

        {
            let mut store = sink.store.lock().unwrap();
            store.upsert_content(&video_id, video)?;
        }

        if let Err(err) = crawler.crawl_video_comments(&video_id, sink).await {
            tracing::warn!("Comment crawl for video {} failed: {}", video_id, err);
        }
    }

    Ok(())
}

/// Sink that lands every delivered comment page in the store
struct StoreSink {
    store: Arc<Mutex<SqliteStore>>,
    stored: AtomicUsize,
}

impl StoreSink {
    fn new(store: Arc<Mutex<SqliteStore>>) -> Self {
        Self {
            store,
            stored: AtomicUsize::new(0),
        }
    }

    /// Total comments written so far
    fn stored(&self) -> usize {
        self.stored.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSink for StoreSink {
    async fn on_page(&self, owner_id: &str, items: &[CommentNode]) -> bilicrawl::Result<()> {
        {
            let mut store = self.store.lock().unwrap();
            for node in items {
                store.upsert_comment(&node.id.to_string(), &node.raw)?;
            }
        }

        self.stored.fetch_add(items.len(), Ordering::SeqCst);
        tracing::debug!("Stored {} comments for video {}", items.len(), owner_id);
        Ok(())
    }
}
