use std::path::PathBuf;
use std::time::Duration;

use crate::{
    errors::{FetcherError, Result},
    rpc::RetryPolicy,
    types::HeightRange,
};

pub const DEFAULT_PARALLELISM: usize = 5;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_OUTPUT_FILE: &str = "blocks.json";

/// Validated settings for one fetch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub start_height: u64,
    pub end_height: u64,
    pub node_url: String,
    pub parallelism: usize,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub output_file: PathBuf,
    pub sort_by_height: bool,
}

/// Parses a human-readable duration such as `1s`, `250ms` or `2m`.
pub fn parse_duration(value: &str) -> Result<Duration> {
    duration_str::parse(value.trim()).map_err(|e| {
        FetcherError::configuration("duration", format!("invalid duration {value:?}: {e}"))
    })
}

impl FetcherConfig {
    #[must_use]
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::new()
    }

    pub fn height_range(&self) -> Result<HeightRange> {
        HeightRange::new(self.start_height, self.end_height)
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_delay)
    }
}

pub struct FetcherConfigBuilder {
    start_height: Option<u64>,
    end_height: Option<u64>,
    node_url: Option<String>,
    parallelism: usize,
    retry_attempts: u32,
    retry_delay: Duration,
    request_timeout: Duration,
    output_file: PathBuf,
    sort_by_height: bool,
}

impl FetcherConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_height: None,
            end_height: None,
            node_url: None,
            parallelism: DEFAULT_PARALLELISM,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            sort_by_height: false,
        }
    }

    #[must_use]
    pub fn development() -> Self {
        Self::new()
            .parallelism(2)
            .retry_attempts(1)
            .retry_delay(Duration::from_millis(250))
    }

    #[must_use]
    pub fn testing() -> Self {
        Self::new()
            .parallelism(2)
            .retry_attempts(1)
            .retry_delay(Duration::from_millis(1))
            .request_timeout(Duration::from_secs(2))
    }

    #[must_use]
    pub const fn start_height(mut self, start_height: u64) -> Self {
        self.start_height = Some(start_height);
        self
    }

    #[must_use]
    pub const fn end_height(mut self, end_height: u64) -> Self {
        self.end_height = Some(end_height);
        self
    }

    #[must_use]
    pub fn node_url<S: Into<String>>(mut self, node_url: S) -> Self {
        self.node_url = Some(node_url.into());
        self
    }

    #[must_use]
    pub const fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[must_use]
    pub const fn retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    #[must_use]
    pub const fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub const fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub fn output_file<P: Into<PathBuf>>(mut self, output_file: P) -> Self {
        self.output_file = output_file.into();
        self
    }

    #[must_use]
    pub const fn sort_by_height(mut self, sort_by_height: bool) -> Self {
        self.sort_by_height = sort_by_height;
        self
    }

    pub fn build(self) -> Result<FetcherConfig> {
        let start_height = self.start_height.ok_or_else(|| {
            FetcherError::configuration("start_height", "Start height is required")
        })?;

        let end_height = self
            .end_height
            .ok_or_else(|| FetcherError::configuration("end_height", "End height is required"))?;

        HeightRange::new(start_height, end_height)?;

        let node_url = self
            .node_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| FetcherError::configuration("node_url", "node URL is required"))?;

        if self.parallelism == 0 {
            return Err(FetcherError::configuration(
                "parallelism",
                "Parallelism must be greater than 0",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(FetcherError::configuration(
                "request_timeout",
                "Request timeout must be greater than 0",
            ));
        }

        if self.output_file.as_os_str().is_empty() {
            return Err(FetcherError::configuration(
                "output_file",
                "Output file path must not be empty",
            ));
        }

        Ok(FetcherConfig {
            start_height,
            end_height,
            node_url,
            parallelism: self.parallelism,
            retry_attempts: self.retry_attempts,
            retry_delay: self.retry_delay,
            request_timeout: self.request_timeout,
            output_file: self.output_file,
            sort_by_height: self.sort_by_height,
        })
    }
}

impl Default for FetcherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
