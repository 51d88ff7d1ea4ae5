//! # Block Fetcher
//!
//! Turns node responses into domain values: the chain identity from `/status` and
//! a [`BlockMetadata`] per height from `/block`. Retries already happened inside
//! the RPC client by the time a response reaches this layer, so any shape error
//! found here is terminal for that request.

use async_trait::async_trait;
use tracing::debug;

use crate::{
    errors::{FetcherError, Result},
    rpc::{BlockResult, CosmosRpcClient, StatusResult},
    types::{BlockMetadata, ChainId},
};

/// Source of chain identity and per-height block metadata.
#[async_trait]
pub trait BlockSource {
    async fn chain_id(&self) -> Result<ChainId>;

    async fn fetch_block(&self, height: u64) -> Result<BlockMetadata>;
}

#[derive(Debug, Clone)]
pub struct BlockFetcher {
    client: CosmosRpcClient,
}

impl BlockFetcher {
    #[must_use]
    pub const fn new(client: CosmosRpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlockSource for BlockFetcher {
    async fn chain_id(&self) -> Result<ChainId> {
        let status = self.client.get_status().await?;
        chain_id_from_status(status)
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockMetadata> {
        let block = self.client.get_block(height).await?;
        let metadata = metadata_from_block(height, &block)?;
        debug!(
            height = metadata.height,
            num_txs = metadata.num_txs,
            "fetched block"
        );
        Ok(metadata)
    }
}

pub fn chain_id_from_status(status: StatusResult) -> Result<ChainId> {
    ChainId::new(status.node_info.network)
}

/// Extracts metadata out of a decoded block response. The header must report
/// `requested`, otherwise one height could end up twice in a run and another never.
pub fn metadata_from_block(requested: u64, block: &BlockResult) -> Result<BlockMetadata> {
    let raw_height = block.block.header.height.as_str();
    let height = raw_height.parse::<u64>().map_err(|e| {
        FetcherError::invalid_block_height(
            requested,
            raw_height,
            format!("failed to parse height: {e}"),
        )
    })?;

    if height != requested {
        return Err(FetcherError::invalid_block_height(
            requested,
            raw_height,
            "header height does not match requested height",
        ));
    }

    Ok(BlockMetadata::new(height, block.block.data.tx_count()))
}
