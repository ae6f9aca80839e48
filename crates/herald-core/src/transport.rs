//! The seam between Herald and the transport that owns the gateway session.
//!
//! Handshake, heartbeat, reconnect and resume are the transport's business.
//! Herald only needs the transport to push [`Payload`]s, one at a time and in
//! delivery order, into a [`PayloadSink`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{TransportError, TransportResult};
use crate::payload::Payload;

/// Settings the application hands to the transport when a session starts.
#[derive(Clone, Default)]
pub struct SessionOptions {
    /// Authentication token, opaque to Herald.
    pub token: String,
    /// Subscription-scope bitmask; `None` lets the remote side pick its default.
    pub intents: Option<u32>,
}

impl SessionOptions {
    /// Creates options for `token` with no explicit intents.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: None,
        }
    }

    /// Sets the subscription-scope bitmask.
    pub fn with_intents(mut self, intents: u32) -> Self {
        self.intents = Some(intents);
        self
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .finish()
    }
}

/// Where a transport delivers payloads.
#[derive(Debug, Clone)]
pub struct PayloadSink {
    tx: mpsc::Sender<Payload>,
}

impl PayloadSink {
    /// Wraps an existing sender.
    pub fn new(tx: mpsc::Sender<Payload>) -> Self {
        Self { tx }
    }

    /// Creates a bounded sink and the receiver the dispatch loop reads from.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Delivers one payload, waiting while the dispatch queue is full.
    pub async fn push(&self, payload: Payload) -> TransportResult<()> {
        self.tx
            .send(payload)
            .await
            .map_err(|_| TransportError::SinkClosed)
    }

    /// Returns `true` once the dispatch loop has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A transport that runs one gateway session.
///
/// `run` returns when `shutdown` is cancelled or the session ends on its own.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "requester"
    }

    /// Runs the session, pushing every inbound payload into `sink`.
    async fn run(
        &self,
        options: SessionOptions,
        sink: PayloadSink,
        shutdown: CancellationToken,
    ) -> TransportResult<()>;
}

/// Shared requester.
pub type BoxedRequester = Arc<dyn Requester>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_debug_redacts_token() {
        let options = SessionOptions::new("secret-token").with_intents(513);
        let debug = format!("{options:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("513"));
    }

    #[tokio::test]
    async fn test_sink_push_and_close() {
        let (sink, mut rx) = PayloadSink::channel(4);
        sink.push(Payload::new("READY", serde_json::Value::Null))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().kind(), Some("READY"));

        drop(rx);
        assert!(sink.is_closed());
        assert!(matches!(
            sink.push(Payload::untagged(serde_json::Value::Null)).await,
            Err(TransportError::SinkClosed)
        ));
    }
}
