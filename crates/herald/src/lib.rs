//! # Herald
//!
//! A client-side adapter for Discord-style chat gateways: untyped payloads in,
//! typed and cache-consistent events out.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐ Payload ┌────────┐ Payload ┌─────────┐ &Record ┌────────┐
//! │ Requester │────────▶│ Client │────────▶│ Gateway │────────▶│ Events │──▶ listeners
//! │(transport)│         │        │         │ + cache │         │        │
//! └───────────┘         └────────┘         └─────────┘         └────────┘
//! ```
//!
//! - **Requester**: owns the connection and pushes payloads in delivery order
//! - **Client**: runs the requester session and the dispatch loop
//! - **Gateway**: classifies payloads, keeps the entity cache, builds records
//! - **Events**: one typed emitter per event key
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RuntimeError> {
//!     let config = load_config()?;
//!     let client = Client::from_config(&config, Arc::new(MyRequester::new()))?;
//!
//!     client.events().message_create.on(|event: &MessageCreate| {
//!         info!(content = %event.message.content, "message");
//!     });
//!
//!     client.run().await
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `herald.toml` (default)
//! - `yaml-config`: load `herald.yaml`
//! - `json-log`: JSON log output

pub use herald_core as core;
pub use herald_gateway as gateway;
pub use herald_runtime as runtime;

/// Commonly used types.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Client lifecycle
    pub use herald_runtime::config::{ConfigLoader, HeraldConfig, load_config};
    pub use herald_runtime::{Client, ClientOptions, ReplayRequester, RuntimeError};

    // Transport seam
    pub use herald_core::{
        BoxedRequester, CancellationToken, Payload, PayloadSink, Requester, SessionOptions,
        TransportError,
    };

    // Event bus
    pub use herald_core::{Emitter, Subscription};
    pub use herald_gateway::events::*;
    pub use herald_gateway::{EventKey, EventRecord, Events, Intent, Intents};

    // Entities
    pub use herald_gateway::model::{
        Channel, ChannelType, Guild, GuildMember, Message, Role, TextChannel, User,
    };

    pub use herald_runtime::tracing::{debug, error, info, trace, warn};
}
