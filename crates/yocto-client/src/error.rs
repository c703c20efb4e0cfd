//! Error types for requests against the printer host API.

use thiserror::Error;

/// Host API errors.
///
/// Only two things can go wrong with a request: the transport fails, or the
/// body cannot be decoded. HTTP status codes are never treated as errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network unreachable, connection refused, request aborted
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body is not valid JSON, or not the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response body is valid JSON but not an object
    #[error("Decode error: expected a JSON object from '{path}'")]
    NotAnObject { path: String },

    /// HTTP method string could not be parsed
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
}

impl ClientError {
    /// Returns true for network-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Returns true when the host answered but the body was unusable.
    pub fn is_decode(&self) -> bool {
        matches!(self, ClientError::Decode(_) | ClientError::NotAnObject { .. })
    }

    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            ClientError::Transport(e) if e.is_connect() => {
                "Could not connect to the printer host. Is it running?".to_string()
            }
            ClientError::Transport(e) => format!("Request to the printer host failed: {}", e),
            ClientError::Decode(_) | ClientError::NotAnObject { .. } => {
                format!("The printer host sent an unexpected response: {}", self)
            }
            ClientError::InvalidMethod(m) => format!("'{}' is not a valid HTTP method", m),
        }
    }
}

/// Result type for host API operations.
pub type Result<T> = std::result::Result<T, ClientError>;
