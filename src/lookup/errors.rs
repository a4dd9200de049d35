// Error types for the lookup pipeline

use thiserror::Error;

/// Shown when the submitted URL is empty after trimming
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";

/// Shown when the backend gave no usable message (or never answered)
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while fetching video information";

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Empty or missing URL, caught before any request is made
    #[error("{}", INVALID_URL_MESSAGE)]
    Validation,

    /// Backend answered with a non-success status
    #[error("Remote error (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Remote {
        status: u16,
        message: Option<String>,
    },

    /// No response at all (connect failure, timeout, reset)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Success status, but the body was not the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LookupError {
    /// Message for the user. Prefers the server's own `error` field;
    /// anything without one collapses to the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => INVALID_URL_MESSAGE.to_string(),
            Self::Remote {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
