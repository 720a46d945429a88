//! Unified error types for shelter.
//!
//! Strategy executors never surface these to a request's caller; they are
//! returned by the store, the lifecycle phases and the host-facing tools.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the shelter worker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown method).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid or unsupported URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Transport-level failure: unreachable host, DNS, connection reset.
    #[error("NETWORK_UNREACHABLE: {0}")]
    NetworkUnreachable(String),

    /// Transport timed out before a response arrived.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// A lifecycle phase was triggered out of order or twice.
    #[error("INVALID_TRANSITION: cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The external background-sync procedure failed.
    #[error("SYNC_FAILED: {0}")]
    SyncFailed(String),

    /// A spawned task panicked or was aborted.
    #[error("TASK_FAILED: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Whether this error is a transport failure the executors fall back on.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkUnreachable(_) | Error::FetchTimeout(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskFailed(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::NetworkUnreachable(msg) => (-32008, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::InvalidTransition { .. } => (-32013, err.to_string()),
            Error::SyncFailed(msg) => (-32014, msg.clone()),
            Error::TaskFailed(msg) => (-32000, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NetworkUnreachable("connection refused".to_string());
        assert!(err.to_string().contains("NETWORK_UNREACHABLE"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_transition_display() {
        let err = Error::InvalidTransition { from: "parsed".into(), to: "activating".into() };
        assert_eq!(err.to_string(), "INVALID_TRANSITION: cannot move from parsed to activating");
    }

    #[test]
    fn test_is_network() {
        assert!(Error::NetworkUnreachable("x".into()).is_network());
        assert!(Error::FetchTimeout("x".into()).is_network());
        assert!(!Error::InvalidInput("x".into()).is_network());
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidUrl("ftp://x".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32003);
    }
}
