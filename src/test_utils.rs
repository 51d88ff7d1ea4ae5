//! # Test Utilities
//!
//! This module provides common utilities and helper functions for testing across the codebase.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

#[cfg(test)]
pub mod test_data {
    /// Node `/block` body for `height` carrying `tx_count` dummy transactions
    pub fn mock_block_response(height: &str, tx_count: usize, timestamp: &str) -> String {
        let txs = vec![r#""tx""#; tx_count].join(",");
        format!(
            r#"{{
                "result": {{
                    "block": {{
                        "header": {{
                            "height": "{height}",
                            "time": "{timestamp}",
                            "chain_id": "test-chain"
                        }},
                        "data": {{ "txs": [{txs}] }}
                    }}
                }}
            }}"#
        )
    }
}

#[cfg(test)]
pub mod assertions {
    use std::collections::HashSet;

    use crate::types::{BlockMetadata, HeightRange};

    /// Asserts `blocks` holds exactly one entry per height of `range`, in any order
    pub fn assert_blocks_cover_range(blocks: &[BlockMetadata], range: HeightRange) {
        let heights: HashSet<u64> = blocks.iter().map(|b| b.height).collect();
        assert_eq!(
            heights.len(),
            blocks.len(),
            "duplicate heights in result: {blocks:?}"
        );
        assert_eq!(blocks.len() as u64, range.len());
        for height in range {
            assert!(heights.contains(&height), "missing height {height}");
        }
    }
}

#[cfg(test)]
pub mod sources {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::errors::{FetcherError, Result};
    use crate::fetcher::BlockSource;
    use crate::types::{BlockMetadata, ChainId};

    /// Scriptable in-memory [`BlockSource`] that records what it was asked for.
    pub struct ScriptedSource {
        chain_id: String,
        chain_id_delay: Duration,
        fetch_delay: Duration,
        slow_heights: HashMap<u64, Duration>,
        failing_heights: HashSet<u64>,
        panicking_heights: HashSet<u64>,
        events: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fetches_started: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new(chain_id: &str) -> Self {
            Self {
                chain_id: chain_id.to_string(),
                chain_id_delay: Duration::ZERO,
                fetch_delay: Duration::ZERO,
                slow_heights: HashMap::new(),
                failing_heights: HashSet::new(),
                panicking_heights: HashSet::new(),
                events: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                fetches_started: AtomicUsize::new(0),
            }
        }

        pub fn chain_id_delay(mut self, delay: Duration) -> Self {
            self.chain_id_delay = delay;
            self
        }

        pub fn fetch_delay(mut self, delay: Duration) -> Self {
            self.fetch_delay = delay;
            self
        }

        pub fn slow_height(mut self, height: u64, delay: Duration) -> Self {
            self.slow_heights.insert(height, delay);
            self
        }

        pub fn failing_height(mut self, height: u64) -> Self {
            self.failing_heights.insert(height);
            self
        }

        pub fn panicking_height(mut self, height: u64) -> Self {
            self.panicking_heights.insert(height);
            self
        }

        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn fetches_started(&self) -> usize {
            self.fetches_started.load(Ordering::SeqCst)
        }

        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Keeps `in_flight` accurate even when a fetch future is dropped mid-way.
    struct InFlightGuard<'a>(&'a AtomicUsize);

    impl Drop for InFlightGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BlockSource for ScriptedSource {
        async fn chain_id(&self) -> Result<ChainId> {
            tokio::time::sleep(self.chain_id_delay).await;
            self.record("chain_id".to_string());
            ChainId::new(self.chain_id.clone())
        }

        async fn fetch_block(&self, height: u64) -> Result<BlockMetadata> {
            self.fetches_started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlightGuard(&self.in_flight);

            self.record(format!("block:{height}"));

            let delay = self
                .slow_heights
                .get(&height)
                .copied()
                .unwrap_or(self.fetch_delay);
            tokio::time::sleep(delay).await;

            if self.panicking_heights.contains(&height) {
                panic!("scripted panic at height {height}");
            }
            if self.failing_heights.contains(&height) {
                return Err(FetcherError::invalid_block_height(
                    height,
                    "not-a-number",
                    "failed to parse height",
                ));
            }

            Ok(BlockMetadata::new(height, (height % 5) as usize))
        }
    }
}
