//! Herald Runtime: configuration, logging and the client lifecycle.
//!
//! - [`config`]: figment-based [`ConfigLoader`] producing a [`HeraldConfig`]
//! - [`logging`]: `tracing-subscriber` setup driven by [`LoggingConfig`](config::LoggingConfig)
//! - [`Client`]: runs a [`Requester`](herald_core::Requester) session and
//!   feeds its payloads through a [`Gateway`](herald_gateway::Gateway)
//! - [`ReplayRequester`]: replays recorded payloads, for tests and demos
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald_runtime::{Client, ReplayRequester, config::load_config};
//!
//! let config = load_config()?;
//! let client = Client::from_config(&config, Arc::new(ReplayRequester::new(payloads)))?;
//! client.run().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod replay;

pub use client::{Client, ClientOptions};
pub use config::{ConfigError, ConfigLoader, ConfigResult, HeraldConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use replay::ReplayRequester;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for application code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
