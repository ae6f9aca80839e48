//! Error types shared across Herald crates.
//!
//! None of these reach an event listener: dispatch errors are logged and the
//! payload dropped, transport errors end the session that produced them.

use thiserror::Error;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised while turning a payload body into typed entities.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The body does not match the wire schema of its event.
    #[error("malformed {event} payload: {source}")]
    Malformed {
        /// The event tag of the offending payload.
        event: String,
        /// The underlying decoding error.
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Creates a malformed-body error for `event`.
    pub fn malformed(event: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Malformed {
            event: event.into(),
            source,
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors reported by a [`Requester`](crate::Requester).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// The remote side rejected the token.
    #[error("authentication failed: {reason}")]
    AuthenticationFailed {
        /// Reason for failure.
        reason: String,
    },

    /// The dispatch loop is gone, payloads can no longer be delivered.
    #[error("payload sink closed")]
    SinkClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
