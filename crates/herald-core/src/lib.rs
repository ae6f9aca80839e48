//! # Herald Core
//!
//! Building blocks shared by every Herald crate:
//!
//! - **Event bus**: [`Emitter<T>`], a typed single-event publish/subscribe
//!   primitive with [`Subscription`] handles for removal.
//! - **Payloads**: [`Payload`], the untyped unit the transport delivers.
//! - **Transport seam**: the [`Requester`] trait and the [`PayloadSink`] it
//!   pushes into.
//! - **Errors**: [`DispatchError`] and [`TransportError`].
//!
//! ```text
//! ┌───────────┐  Payload  ┌──────────┐  &Record  ┌──────────┐
//! │ Requester │──────────▶│ Gateway  │──────────▶│ Emitter  │──▶ listeners
//! └───────────┘           └──────────┘           └──────────┘
//! ```

pub mod emitter;
pub mod error;
pub mod payload;
pub mod transport;

pub use emitter::{Emitter, Listener, Subscription};
pub use error::{DispatchError, DispatchResult, TransportError, TransportResult};
pub use payload::Payload;
pub use transport::{BoxedRequester, PayloadSink, Requester, SessionOptions};

// Re-exported so transports need not depend on tokio-util directly.
pub use tokio_util::sync::CancellationToken;
