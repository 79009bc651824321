//! Errors from the "ask about this item" assistant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AskError {
    /// No API key in config or environment.
    #[error("AI assistant is not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Empty response from AI assistant")]
    EmptyResponse,

    #[error("AI request timed out after {0}s")]
    Timeout(u64),
}
