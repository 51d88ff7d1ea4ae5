//! # Cosmos Block Fetcher
//!
//! Fetches block metadata (height and transaction count) for a closed range of heights
//! from a Cosmos/Tendermint node's JSON RPC interface, concurrently over a bounded
//! worker pool, and produces one JSON document with the chain identity and the blocks.
//!
//! ## Architecture Overview
//!
//! ### Public API Modules
//! - [`commands`] - End-to-end fetch operation (config in, persisted document out)
//! - [`config`] - Validated run configuration and its builder
//! - [`errors`] - Domain-specific error types
//! - [`pipeline`] - Worker pool orchestration and fan-in aggregation
//! - [`types`] - Domain models (`HeightRange`, `BlockMetadata`, `ChainId`, `Output`)
//!
//! ### Building Blocks
//! - [`rpc`] - HTTP client for the node with per-request retry and linear backoff
//! - [`fetcher`] - `BlockSource` trait and the RPC-backed `BlockFetcher`
//! - [`output`] - JSON persistence of a finished run
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  commands  (config → output file)          │
//! └────────────────────────────────────────────┘
//!                      ↓
//! ┌────────────────────────────────────────────┐
//! │  pipeline  (workers, outcomes, collector)  │
//! └────────────────────────────────────────────┘
//!                      ↓
//! ┌────────────────────────────────────────────┐
//! │  fetcher → rpc    │    output              │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use cosmos_block_fetcher::{commands::fetch_blocks, config::FetcherConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> cosmos_block_fetcher::Result<()> {
//! let config = FetcherConfig::builder()
//!     .start_height(1_000_000)
//!     .end_height(1_000_100)
//!     .node_url("http://localhost:26657")
//!     .parallelism(8)
//!     .output_file("blocks.json")
//!     .build()?;
//!
//! fetch_blocks(&config, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unused_crate_dependencies)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

// Used by the binary only.
use clap as _;
use ctrlc as _;
use dotenvy as _;
use eyre as _;
use tracing_subscriber as _;
// Serves the mock node in the integration tests.
#[cfg(test)]
use axum as _;

pub mod commands;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod output;
pub mod pipeline;
pub mod rpc;
pub mod types;

#[cfg(test)]
mod mocks;
#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod test_utils;

pub use errors::{FetcherError, Result};
pub use types::{BlockMetadata, ChainId, FetchOutcome, HeightRange, Output};
