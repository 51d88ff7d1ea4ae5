//! Property-based tests for height ranges, retry backoff and response decoding

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use crate::fetcher::metadata_from_block;
use crate::rpc::{BlockResult, RetryPolicy, RpcResponse};
use crate::test_utils::test_data::mock_block_response;
use crate::types::HeightRange;
use proptest::prelude::*;

/// Generate (start, end) pairs with end >= start and a span small enough to iterate
fn valid_bounds() -> impl Strategy<Value = (u64, u64)> {
    (0..=u64::MAX - 10_000, 0..10_000u64).prop_map(|(start, span)| (start, start + span))
}

proptest! {
    /// Valid ranges report the exact closed-interval size
    #[test]
    fn prop_height_range_len((start, end) in valid_bounds()) {
        let range = HeightRange::new(start, end).unwrap();
        prop_assert_eq!(range.len(), end - start + 1);
        prop_assert!(range.contains(start));
        prop_assert!(range.contains(end));
    }

    /// Inverted ranges are always rejected
    #[test]
    fn prop_height_range_rejects_inverted(start in 1..=u64::MAX, gap in 1..=1_000u64) {
        let end = start.saturating_sub(gap);
        prop_assert!(HeightRange::new(start, end).is_err());
    }

    /// Iteration yields every height exactly once, ascending
    #[test]
    fn prop_height_range_iter_ascending(start in 0..1_000_000u64, span in 0..500u64) {
        let range = HeightRange::new(start, start + span).unwrap();
        let heights: Vec<u64> = range.iter().collect();
        prop_assert_eq!(heights.len() as u64, range.len());
        prop_assert!(heights.windows(2).all(|w| w[1] == w[0] + 1));
    }

    /// Backoff grows linearly with the attempt number
    #[test]
    fn prop_backoff_is_linear(delay_ms in 0..10_000u64, attempt in 0..100u32) {
        let policy = RetryPolicy::new(100, Duration::from_millis(delay_ms));
        prop_assert_eq!(
            policy.backoff(attempt),
            Duration::from_millis(delay_ms * u64::from(attempt))
        );
    }

    /// Decoding a block payload recovers height and tx count, identically every time
    #[test]
    fn prop_block_decode_roundtrip(height in any::<u64>(), txs in 0..50usize) {
        let json = mock_block_response(&height.to_string(), txs, "2023-01-01T00:00:00Z");
        let block: RpcResponse<BlockResult> = serde_json::from_str(&json).unwrap();

        let first = metadata_from_block(height, &block.result).unwrap();
        let second = metadata_from_block(height, &block.result).unwrap();

        prop_assert_eq!(first.height, height);
        prop_assert_eq!(first.num_txs, txs);
        prop_assert_eq!(first, second);
    }

    /// Non-numeric height strings are rejected for the requested height
    #[test]
    fn prop_block_decode_rejects_non_numeric(height in any::<u64>(), junk in "[a-zA-Z_-]{1,12}") {
        let json = mock_block_response(&junk, 1, "2023-01-01T00:00:00Z");
        let block: RpcResponse<BlockResult> = serde_json::from_str(&json).unwrap();

        let err = metadata_from_block(height, &block.result).unwrap_err();
        prop_assert_eq!(err.failed_height(), Some(height));
    }

    /// A header reporting any other height is rejected for the requested height
    #[test]
    fn prop_block_decode_rejects_other_height(requested in any::<u64>(), reported in any::<u64>()) {
        prop_assume!(requested != reported);
        let json = mock_block_response(&reported.to_string(), 1, "2023-01-01T00:00:00Z");
        let block: RpcResponse<BlockResult> = serde_json::from_str(&json).unwrap();

        let err = metadata_from_block(requested, &block.result).unwrap_err();
        prop_assert_eq!(err.failed_height(), Some(requested));
    }
}
