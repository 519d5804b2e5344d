//! Console error types and handling

use thiserror::Error;

/// Errors surfaced by the console core.
///
/// Everything here is recoverable: a failed fetch is retried with
/// `refresh()`, a bad query is corrected by the operator. The variants
/// hold rendered messages rather than source errors so that resource
/// snapshots can carry them by value.
#[derive(Debug, Clone, Error)]
pub enum ConsoleError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid query text: {0}")]
    InvalidQuery(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using ConsoleError
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ConsoleError::Decode(err.to_string())
        } else {
            ConsoleError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Decode(err.to_string())
    }
}
