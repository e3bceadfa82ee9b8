//! Error types for mcp-agent

use thiserror::Error;

/// Result type alias using mcp-agent's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mcp-agent
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model endpoint error (non-success status, malformed body)
    #[error("Model error: {0}")]
    Model(String),

    /// Error reported by an MCP peer
    #[error("MCP error: {0}")]
    Mcp(String),

    /// Transport-level failure talking to the tool server
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON-RPC framing or shape violation
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if the error happened on the wire rather than in the peer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Io(_) | Error::Http(_) | Error::Timeout(_)
        )
    }

    /// Check if error is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Connection("closed".into()).is_transport());
        assert!(Error::Timeout("30s".into()).is_transport());
        assert!(!Error::Mcp("boom".into()).is_transport());

        assert!(Error::InvalidInput("x".into()).is_client_error());
        assert!(!Error::Internal("x".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("Invalid arguments for add: missing field `b`".into());
        assert_eq!(err.to_string(), "Invalid input: Invalid arguments for add: missing field `b`");
    }
}
