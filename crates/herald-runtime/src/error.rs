//! Runtime error types.

use herald_core::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while driving a client session.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `connect` was called while a session is still running.
    #[error("Client is already connected")]
    AlreadyConnected,

    /// No authentication token was configured.
    #[error("No token configured")]
    MissingToken,

    /// The requester reported a session failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A session task panicked or was aborted.
    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
