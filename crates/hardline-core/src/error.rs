//! Transport-level error reasons carried inside non-response outcomes.
//!
//! These never cross the `Transport` boundary as Rust errors; they ride
//! inside `Outcome::ConnectionFailed`, `Outcome::MalformedResponse` and
//! `Outcome::Failure` so callers can log or match on the reason.

use thiserror::Error;

/// Reason attached to an outcome that carries no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established: DNS failure, refused or
    /// unreachable peer, or a TLS handshake failure.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Bytes arrived but the status line or header block did not parse.
    #[error("malformed response head: {0}")]
    MalformedHead(String),

    /// Handle or sink setup failed before any exchange took place.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The exchange started but failed mid-transfer (send/recv error,
    /// timeout, aborted body write).
    #[error("transfer failed: {0}")]
    Transfer(String),
}

impl TransportError {
    /// Classify a curl error. Resolve/connect/TLS-handshake class errors
    /// become `Connect`; everything else is a `Transfer` failure.
    pub fn from_curl(e: &curl::Error) -> Self {
        if e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_couldnt_connect()
            || e.is_ssl_connect_error()
            || e.is_peer_failed_verification()
        {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Transfer(e.to_string())
        }
    }

    /// True when this reason means no connection was ever established.
    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_non_empty() {
        let e = TransportError::Connect("connection refused".to_string());
        assert!(!e.to_string().is_empty());
        assert!(e.to_string().contains("refused"));
    }

    #[test]
    fn connect_predicate() {
        assert!(TransportError::Connect("x".into()).is_connect());
        assert!(!TransportError::Transfer("x".into()).is_connect());
        assert!(!TransportError::Setup("x".into()).is_connect());
    }
}
