//! Common error types for tamizajes clients

use thiserror::Error;

/// Common result type for tamizajes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the HTTP wrapper, the retry executor and the
/// dashboard services.
#[derive(Error, Debug)]
pub enum Error {
    /// No response reached the client (connection refused, DNS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response received with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response received but its body does not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Result discarded because a more recent action of the same kind won
    #[error("Superseded: {0}")]
    Superseded(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a retry may succeed.
    ///
    /// Transport failures, 429 and 5xx responses are transient. Every other
    /// 4xx is a permanent rejection of the request.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
