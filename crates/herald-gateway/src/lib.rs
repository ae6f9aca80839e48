//! # Herald Gateway
//!
//! Turns untyped gateway payloads into typed, cache-consistent events.
//!
//! ```text
//! Payload ──▶ Gateway::handle ──▶ dispatch ──▶ model (rebuild entities)
//!                    │                │
//!                    ▼                ▼
//!              EntityCache ◀──── read / write
//!                                     │
//!                                     ▼
//!                              Events (one Emitter per key) ──▶ listeners
//! ```
//!
//! - [`model`]: entities and polymorphic [`Channel`](model::Channel) construction
//! - [`cache`]: guilds, channel-to-guild index, direct-message channels
//! - [`events`]: record types and the [`Events`] bundle
//! - [`intents`]: subscription scopes and the events each one unlocks
//! - [`Gateway`]: owns the cache and routes payloads

pub mod cache;
mod dispatch;
pub mod events;
mod gateway;
pub mod intents;
pub mod model;

pub use cache::EntityCache;
pub use dispatch::handle_event;
pub use events::{EventKey, EventRecord, Events};
pub use gateway::Gateway;
pub use intents::{Intent, Intents, ScopedEvents, events_by_intent, events_by_intents};
