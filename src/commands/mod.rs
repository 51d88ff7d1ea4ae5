//! # Fetch Command
//!
//! Wires a [`FetcherConfig`] to the RPC client, the block fetcher, and the
//! [`Orchestrator`], then hands a successful result to the output writer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cosmos_block_fetcher::commands::fetch_blocks;
//! use cosmos_block_fetcher::config::FetcherConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> cosmos_block_fetcher::Result<()> {
//! let config = FetcherConfig::builder()
//!     .start_height(100)
//!     .end_height(105)
//!     .node_url("http://localhost:26657")
//!     .build()?;
//!
//! let output = fetch_blocks(&config, CancellationToken::new()).await?;
//! println!("{} blocks from {}", output.blocks.len(), output.chain_id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::FetcherConfig,
    errors::Result,
    fetcher::BlockFetcher,
    output::write_output,
    pipeline::Orchestrator,
    rpc::CosmosRpcClient,
    types::Output,
};

/// Fetches the configured range and returns the aggregate without persisting it.
pub async fn collect_blocks(config: &FetcherConfig, shutdown: CancellationToken) -> Result<Output> {
    let range = config.height_range()?;

    let client = CosmosRpcClient::new(
        config.node_url.clone(),
        config.retry_policy(),
        config.request_timeout,
    )?;
    let fetcher = Arc::new(BlockFetcher::new(client));

    let orchestrator = Orchestrator::new(fetcher, range, config.parallelism, shutdown)?;
    let mut output = orchestrator.run().await?;

    if config.sort_by_height {
        output.sort_by_height();
    }

    Ok(output)
}

/// Fetches the configured range and writes it to `config.output_file`.
/// Nothing is written unless every height was fetched.
pub async fn fetch_blocks(config: &FetcherConfig, shutdown: CancellationToken) -> Result<Output> {
    let output = collect_blocks(config, shutdown).await?;

    write_output(&config.output_file, &output)?;
    info!(
        "Successfully written {} blocks ({} - {}) to {}",
        output.blocks.len(),
        config.start_height,
        config.end_height,
        config.output_file.display()
    );

    Ok(output)
}
