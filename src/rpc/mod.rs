//! # Cosmos RPC Client
//!
//! HTTP GET access to a Tendermint/CometBFT node's JSON RPC surface. Every logical
//! request goes through [`CosmosRpcClient::get_json`], which owns the retry policy:
//! up to `retry_attempts + 1` attempts, with a linear backoff of
//! `retry_delay * attempt` before each retry.
//!
//! Endpoints used:
//! - `GET {node}/status`
//! - `GET {node}/block?height={h}`

use crate::errors::{FetcherError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

// Response bodies longer than this are truncated in logs.
const LOG_SNIPPET_LEN: usize = 256;

#[derive(Deserialize, Debug)]
pub struct RpcResponse<T> {
    pub result: T,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    pub node_info: NodeInfo,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub network: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BlockResult {
    pub block: Block,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub data: BlockData,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BlockData {
    // Tendermint reports `null` for blocks without transactions.
    #[serde(default)]
    pub txs: Option<Vec<serde_json::Value>>,
}

impl BlockData {
    #[must_use]
    pub fn tx_count(&self) -> usize {
        self.txs.as_ref().map_or(0, Vec::len)
    }
}

/// How many times one logical request is retried and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retry_attempts: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(retry_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            retry_attempts,
            retry_delay,
        }
    }

    /// Total attempts, the first one included.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }

    /// Delay before attempt number `attempt` (zero-based). Linear, not exponential.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

#[derive(Debug, Clone)]
pub struct CosmosRpcClient {
    client: Client,
    node_url: String,
    retry_policy: RetryPolicy,
}

impl CosmosRpcClient {
    pub fn new(
        node_url: impl Into<String>,
        retry_policy: RetryPolicy,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FetcherError::configuration("http_client", e.to_string()))?;

        Ok(Self {
            client,
            node_url: node_url.into().trim_end_matches('/').to_string(),
            retry_policy,
        })
    }

    #[must_use]
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    #[must_use]
    pub fn status_url(&self) -> String {
        format!("{}/status", self.node_url)
    }

    #[must_use]
    pub fn block_url(&self, height: u64) -> String {
        format!("{}/block?height={height}", self.node_url)
    }

    pub async fn get_status(&self) -> Result<StatusResult> {
        self.get_json::<RpcResponse<StatusResult>>(&self.status_url())
            .await
            .map(|response| response.result)
    }

    pub async fn get_block(&self, height: u64) -> Result<BlockResult> {
        self.get_json::<RpcResponse<BlockResult>>(&self.block_url(height))
            .await
            .map(|response| response.result)
    }

    /// GET `url` and decode its JSON body, retrying transient failures.
    pub async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let max_attempts = self.retry_policy.max_attempts();
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let backoff = self.retry_policy.backoff(attempt);
                debug!(url, attempt, ?backoff, "sleeping before retry");
                sleep(backoff).await;
            }

            match self.get_json_once(url).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!(
                        "Request to {} failed: {}. Attempt {}/{}",
                        url,
                        e,
                        attempt + 1,
                        max_attempts
                    );
                    last_error = Some(e);
                }
            }
        }

        let last_error =
            last_error.unwrap_or_else(|| FetcherError::internal("no attempt was made"));
        Err(FetcherError::retries_exhausted(
            url,
            max_attempts,
            last_error,
        ))
    }

    async fn get_json_once<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetcherError::unexpected_status(status.as_u16()));
        }

        let text = response.text().await?;
        serde_json::from_str::<R>(&text).map_err(|e| {
            debug!(
                "Deserialization error: {:?}\nResponse snippet: {:?}",
                e,
                snippet(&text)
            );
            e.into()
        })
    }
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(LOG_SNIPPET_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
