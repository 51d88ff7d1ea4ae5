use crate::errors::{FetcherError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// A closed interval of block heights, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeightRange {
    start: u64,
    end: u64,
}

impl HeightRange {
    /// Creates a new `HeightRange`, rejecting `end < start`
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end < start {
            return Err(FetcherError::invalid_range(start, end));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Number of heights in the range. Saturates for the full `u64` span.
    #[must_use]
    pub const fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// A validated range always holds at least one height.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub const fn contains(&self, height: u64) -> bool {
        height >= self.start && height <= self.end
    }

    /// Heights in ascending order
    #[must_use]
    pub fn iter(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

impl fmt::Display for HeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl IntoIterator for HeightRange {
    type Item = u64;
    type IntoIter = RangeInclusive<u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Metadata of one fetched block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub height: u64,
    pub num_txs: usize,
}

impl BlockMetadata {
    #[must_use]
    pub const fn new(height: u64, num_txs: usize) -> Self {
        Self { height, num_txs }
    }
}

/// The network identifier reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Creates a new `ChainId`, rejecting blank identifiers
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FetcherError::invalid_response(
                "node_info.network",
                "chain identifier is empty",
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a worker reports back for one height
#[derive(Debug)]
pub enum FetchOutcome {
    Success(BlockMetadata),
    Failure { height: u64, error: FetcherError },
}

/// The aggregated result of a successful run, as persisted to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub chain_id: ChainId,
    pub blocks: Vec<BlockMetadata>,
}

impl Output {
    #[must_use]
    pub const fn new(chain_id: ChainId, blocks: Vec<BlockMetadata>) -> Self {
        Self { chain_id, blocks }
    }

    /// Blocks arrive in completion order; this puts them in height order.
    pub fn sort_by_height(&mut self) {
        self.blocks.sort_unstable_by_key(|block| block.height);
    }
}
