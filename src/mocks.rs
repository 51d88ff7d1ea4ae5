//! # Mock Implementations for Testing
//!
//! This module provides mock implementations of core traits to enable isolated unit testing
//! without requiring a live node.
//!
//! ## Available Mocks
//!
//! - [`MockBlockSource`] - Mock implementation of [`crate::fetcher::BlockSource`]

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use mockall::mock;

use crate::errors::Result;
use crate::fetcher::BlockSource;
use crate::types::{BlockMetadata, ChainId};

mock! {
    /// Mock implementation of the block source trait.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let mut source = MockBlockSource::new();
    /// source
    ///     .expect_chain_id()
    ///     .times(1)
    ///     .returning(|| Ok(ChainId::new("test-chain").unwrap()));
    /// ```
    pub BlockSource {}

    #[async_trait::async_trait]
    impl BlockSource for BlockSource {
        async fn chain_id(&self) -> Result<ChainId>;
        async fn fetch_block(&self, height: u64) -> Result<BlockMetadata>;
    }
}
