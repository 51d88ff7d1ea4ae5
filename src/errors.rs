use std::path::Path;

use thiserror::Error;

/// Domain-specific error types for the block fetcher
#[derive(Error, Debug)]
pub enum FetcherError {
    /// Transport-level failure of a single HTTP attempt
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// The node answered with a non-success status code
    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body was not the JSON shape we expected
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Every attempt of one logical request failed
    #[error("request to {url} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<FetcherError>,
    },

    /// The header height string of a block could not be used
    #[error("invalid height {value:?} in block {height}: {reason}")]
    InvalidBlockHeight {
        height: u64,
        value: String,
        reason: String,
    },

    /// The response decoded but a required field was unusable
    #[error("invalid {field} in node response: {reason}")]
    InvalidResponse { field: String, reason: String },

    /// Chain identity could not be resolved, nothing was fetched
    #[error("failed to get chain ID: {source}")]
    ChainIdUnavailable {
        #[source]
        source: Box<FetcherError>,
    },

    /// Terminal failure for one height, aborts the run
    #[error("failed to fetch block {height}: {source}")]
    BlockFetchFailed {
        height: u64,
        #[source]
        source: Box<FetcherError>,
    },

    /// A worker task panicked or was aborted
    #[error("worker {worker} stopped unexpectedly: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// The run was cancelled before it could complete
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {parameter} - {message}")]
    Configuration { parameter: String, message: String },

    /// Range errors for block operations
    #[error("end height must be greater than or equal to start height: start={start}, end={end}")]
    InvalidHeightRange { start: u64, end: u64 },

    /// Persisting the aggregated result failed
    #[error("failed to write output {path}: {message}")]
    Output { path: String, message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FetcherError {
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn unexpected_status(status: u16) -> Self {
        Self::UnexpectedStatus { status }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn retries_exhausted(url: impl Into<String>, attempts: u32, last: Self) -> Self {
        Self::RetriesExhausted {
            url: url.into(),
            attempts,
            source: Box::new(last),
        }
    }

    pub fn invalid_block_height(
        height: u64,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidBlockHeight {
            height,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn chain_id_unavailable(cause: Self) -> Self {
        Self::ChainIdUnavailable {
            source: Box::new(cause),
        }
    }

    #[must_use]
    pub fn block_fetch_failed(height: u64, cause: Self) -> Self {
        Self::BlockFetchFailed {
            height,
            source: Box::new(cause),
        }
    }

    pub fn worker_panicked(worker: usize, message: impl Into<String>) -> Self {
        Self::WorkerPanicked {
            worker,
            message: message.into(),
        }
    }

    pub fn configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn invalid_range(start: u64, end: u64) -> Self {
        Self::InvalidHeightRange { start, end }
    }

    pub fn output(path: &Path, message: impl Into<String>) -> Self {
        Self::Output {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors a single attempt may recover from on the next try.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::UnexpectedStatus { .. } | Self::Decode { .. }
        )
    }

    /// The height a run failed on, if the failure is tied to one.
    #[must_use]
    pub const fn failed_height(&self) -> Option<u64> {
        match self {
            Self::BlockFetchFailed { height, .. } | Self::InvalidBlockHeight { height, .. } => {
                Some(*height)
            }
            _ => None,
        }
    }
}

/// Result type alias for fetcher operations
pub type Result<T> = std::result::Result<T, FetcherError>;

impl From<reqwest::Error> for FetcherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else if err.is_timeout() {
            Self::http(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::http(format!("connection error: {err}"))
        } else {
            Self::http(format!("request error: {err}"))
        }
    }
}

impl From<serde_json::Error> for FetcherError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<std::io::Error> for FetcherError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {err}"))
    }
}
