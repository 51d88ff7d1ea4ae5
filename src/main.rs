use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use cosmos_block_fetcher::{
    commands::fetch_blocks,
    config::{
        parse_duration, FetcherConfig, DEFAULT_OUTPUT_FILE, DEFAULT_PARALLELISM,
        DEFAULT_RETRY_ATTEMPTS,
    },
};
use eyre::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// A parallel block fetcher for Cosmos-based blockchains.
///
/// Retrieves block metadata for a range of heights with parallel workers and
/// retries, and stores it as a JSON document.
#[derive(Parser, Debug)]
#[command(name = "cosmos-block-fetcher", version, about, long_about)]
struct Cli {
    /// Starting block height
    #[arg(long, env = "START_HEIGHT")]
    start_height: u64,

    /// Ending block height (inclusive)
    #[arg(long, env = "END_HEIGHT")]
    end_height: u64,

    /// Cosmos RPC endpoint URL
    #[arg(long, env = "NODE_URL")]
    node_url: String,

    /// Number of parallel fetchers
    #[arg(long, env = "PARALLELISM", default_value_t = DEFAULT_PARALLELISM)]
    parallelism: usize,

    /// Output JSON file path
    #[arg(long, env = "OUTPUT_FILE", default_value = DEFAULT_OUTPUT_FILE)]
    output_file: PathBuf,

    /// Number of retry attempts per request
    #[arg(long, env = "RETRY_ATTEMPTS", default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    retry_attempts: u32,

    /// Base delay between retries (e.g. 1s, 500ms), multiplied by the attempt number
    #[arg(long, env = "RETRY_DELAY", default_value = "1s", value_parser = parse_duration)]
    retry_delay: Duration,

    /// Timeout of a single HTTP request (e.g. 10s)
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "10s", value_parser = parse_duration)]
    request_timeout: Duration,

    /// Sort blocks by height before writing
    #[arg(long)]
    sort: bool,
}

impl Cli {
    fn into_config(self) -> cosmos_block_fetcher::Result<FetcherConfig> {
        FetcherConfig::builder()
            .start_height(self.start_height)
            .end_height(self.end_height)
            .node_url(self.node_url)
            .parallelism(self.parallelism)
            .output_file(self.output_file)
            .retry_attempts(self.retry_attempts)
            .retry_delay(self.retry_delay)
            .request_timeout(self.request_timeout)
            .sort_by_height(self.sort)
            .build()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_config().context("Invalid configuration")?;

    let shutdown = CancellationToken::new();
    setup_ctrlc_handler(shutdown.clone())?;

    info!("Starting block fetcher");
    let output = fetch_blocks(&config, shutdown)
        .await
        .context("Block fetch failed")?;

    info!(
        "Fetched {} blocks of chain {}",
        output.blocks.len(),
        output.chain_id
    );
    Ok(())
}

fn setup_ctrlc_handler(shutdown: CancellationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C");
        info!("Cancelling outstanding requests...");
        shutdown.cancel();
    })
    .context("Failed to set Ctrl+C handler")
}
