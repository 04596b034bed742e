//! Crate-level error types.
//!
//! [`ChartistError`] unifies every fatal error source (configuration,
//! market-data retrieval, indicator warm-up) behind a single enum so
//! callers can match on the variant they care about while still using the
//! `?` operator for easy propagation.
//!
//! Degenerate candles (zero range) and a missing funding rate are not
//! errors: the analysis treats them as neutral inputs.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChartistError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum ChartistError {
    /// An environment variable or config file held an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A market-data request failed after all retries.
    #[error("failed to fetch {resource}: {reason}")]
    DataFetch { resource: String, reason: String },

    /// The exchange refused the request (HTTP 4xx other than 429).
    #[error("{resource} rejected with HTTP {status}: {body}")]
    Rejected {
        resource: String,
        status: u16,
        body: String,
    },

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange answered with a payload we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fewer candles than an indicator needs to produce a value.
    #[error("insufficient data for {indicator}: need {required} candles, got {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },
}

impl ChartistError {
    /// Returns `true` for errors worth retrying against the exchange.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::DataFetch { .. } => true,
            _ => false,
        }
    }
}
