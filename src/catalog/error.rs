//! Fetch errors and their user-facing classification.

use std::fmt;

use thiserror::Error;

/// Coarse reason a load failed, as shown to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkUnreachable,
    MalformedResponse,
    RateLimited,
    Unauthorized,
    Unknown,
}

impl ErrorKind {
    /// Stable identifier for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkUnreachable => "network_unreachable",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether retrying the same request later can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkUnreachable | ErrorKind::RateLimited | ErrorKind::Unknown
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::NetworkUnreachable => "The catalog could not be reached",
            ErrorKind::MalformedResponse => "The catalog sent a response that could not be read",
            ErrorKind::RateLimited => "Too many requests, try again shortly",
            ErrorKind::Unauthorized => "The catalog rejected the API credentials",
            ErrorKind::Unknown => "Something went wrong while loading",
        };
        f.write_str(text)
    }
}

/// Errors produced by a page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure talking to the catalog
    #[error("Connection to '{endpoint}' failed: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Catalog answered with a non-success status
    #[error("Catalog error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Body was not the JSON we expected
    #[error("Malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client is missing credentials or endpoint
    #[error("Catalog client not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Classify into the taxonomy the view state exposes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Connection { source, .. } => {
                if source.is_decode() {
                    ErrorKind::MalformedResponse
                } else if source.is_connect() || source.is_timeout() || source.is_request() {
                    ErrorKind::NetworkUnreachable
                } else {
                    ErrorKind::Unknown
                }
            }
            FetchError::Timeout { .. } => ErrorKind::NetworkUnreachable,
            FetchError::Status { status, .. } => match status {
                401 | 403 => ErrorKind::Unauthorized,
                429 => ErrorKind::RateLimited,
                _ => ErrorKind::Unknown,
            },
            FetchError::Decode(_) => ErrorKind::MalformedResponse,
            FetchError::NotConfigured(_) => ErrorKind::Unauthorized,
            FetchError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the client should retry this request on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Connection { source, .. } => source.is_connect() || source.is_timeout(),
            FetchError::Timeout { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
