//! A requester that replays recorded payloads instead of opening a connection.

use async_trait::async_trait;
use herald_core::{
    CancellationToken, Payload, PayloadSink, Requester, SessionOptions, TransportResult,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Pushes a fixed list of payloads, in order, then ends the session.
///
/// With [`hold_open`](Self::hold_open) the session instead stays up after the
/// last payload until it is cancelled, like a live connection would.
#[derive(Debug, Default)]
pub struct ReplayRequester {
    payloads: Vec<Payload>,
    hold_open: bool,
    last_options: Mutex<Option<SessionOptions>>,
}

impl ReplayRequester {
    pub fn new(payloads: Vec<Payload>) -> Self {
        Self {
            payloads,
            ..Default::default()
        }
    }

    /// Parses raw gateway frames (`{"t": ..., "d": ...}`).
    pub fn from_frames<'a>(
        frames: impl IntoIterator<Item = &'a str>,
    ) -> serde_json::Result<Self> {
        let payloads = frames
            .into_iter()
            .map(Payload::from_json)
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(Self::new(payloads))
    }

    /// Keeps the session open after the last payload until cancelled.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// The options the most recent session was started with.
    pub fn session_options(&self) -> Option<SessionOptions> {
        self.last_options.lock().clone()
    }
}

#[async_trait]
impl Requester for ReplayRequester {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn run(
        &self,
        options: SessionOptions,
        sink: PayloadSink,
        shutdown: CancellationToken,
    ) -> TransportResult<()> {
        debug!(payloads = self.payloads.len(), intents = ?options.intents, "Replay started");
        *self.last_options.lock() = Some(options);

        for payload in &self.payloads {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("Replay cancelled");
                    return Ok(());
                }
                pushed = sink.push(payload.clone()) => pushed?,
            }
            trace!(kind = payload.kind().unwrap_or("untagged"), "Replayed payload");
        }

        if self.hold_open {
            shutdown.cancelled().await;
        }
        debug!("Replay finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_frames_in_order() {
        let requester = ReplayRequester::from_frames([
            r#"{"op": 0, "t": "READY", "d": {}}"#,
            r#"{"op": 0, "t": "TYPING_START", "d": {"channel_id": "c1"}}"#,
        ])
        .unwrap();
        let (sink, mut rx) = PayloadSink::channel(1);

        let run = tokio::spawn(async move {
            requester
                .run(SessionOptions::new("t"), sink, CancellationToken::new())
                .await
        });

        assert_eq!(rx.recv().await.unwrap().kind(), Some("READY"));
        assert_eq!(rx.recv().await.unwrap().kind(), Some("TYPING_START"));
        assert!(rx.recv().await.is_none());
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_while_blocked() {
        let requester = ReplayRequester::new(vec![
            Payload::untagged(serde_json::Value::Null),
            Payload::untagged(serde_json::Value::Null),
        ]);
        let (sink, _rx) = PayloadSink::channel(1);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        requester
            .run(SessionOptions::new("t"), sink, shutdown)
            .await
            .unwrap();
    }

    #[test]
    fn test_from_frames_rejects_garbage() {
        assert!(ReplayRequester::from_frames(["not json"]).is_err());
    }
}
