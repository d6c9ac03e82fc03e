//! Discovery error types.
//!
//! # Severity
//!
//! Only a failed session open is fatal to a discovery run. Everything
//! raised while retrieving a single subtree (`Transport`, `Timeout`, `Rpc`,
//! `Extraction`, ...) is recorded against that subtree and the run moves on
//! to the next catalog entry. See [`crate::discovery`] for the classification.

use std::time::Duration;

use thiserror::Error;

use crate::protocol::RpcError;

/// Discovery errors.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Session could not be established (resolve, connect, authenticate, hello).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Established session failed while exchanging a message.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A command did not complete within the command timeout.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Device answered with one or more error-severity `<rpc-error>`s.
    #[error("RPC error: {}", summarize(.0))]
    Rpc(Vec<RpcError>),

    /// Reply document could not be queried.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Malformed NETCONF message framing.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Peer violated the NETCONF message exchange.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation requires an open session.
    #[error("Session closed")]
    SessionClosed,

    /// Unknown device family requested.
    #[error("Unknown device family: {0}")]
    UnknownFamily(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

fn summarize(errors: &[RpcError]) -> String {
    match errors.first() {
        Some(first) if errors.len() > 1 => format!("{first} (+{} more)", errors.len() - 1),
        Some(first) => first.to_string(),
        None => "empty rpc-error list".to_string(),
    }
}

impl From<toml::de::Error> for DiscoveryError {
    fn from(err: toml::de::Error) -> Self {
        DiscoveryError::Config(err.to_string())
    }
}

impl From<quick_xml::Error> for DiscoveryError {
    fn from(err: quick_xml::Error) -> Self {
        DiscoveryError::Protocol(format!("XML error: {err}"))
    }
}

#[cfg(feature = "ssh")]
impl From<russh::Error> for DiscoveryError {
    fn from(err: russh::Error) -> Self {
        DiscoveryError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display_summarizes() {
        let errors = vec![
            RpcError {
                error_type: "application".to_string(),
                tag: "operation-failed".to_string(),
                severity: "error".to_string(),
                message: "boom".to_string(),
                info: None,
            },
            RpcError {
                error_type: "protocol".to_string(),
                tag: "bad-element".to_string(),
                severity: "error".to_string(),
                message: "second".to_string(),
                info: Some("router".to_string()),
            },
        ];

        let text = DiscoveryError::Rpc(errors).to_string();
        assert!(text.contains("boom"));
        assert!(text.contains("+1 more"));
    }

    #[test]
    fn test_timeout_display_keeps_sub_second_precision() {
        let err = DiscoveryError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "Timed out after 200ms");
        let err = DiscoveryError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "Timed out after 300s");
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: DiscoveryError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(matches!(err, DiscoveryError::Config(_)));
    }
}
