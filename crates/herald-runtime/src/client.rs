//! Client lifecycle: one requester session feeding one dispatch loop.
//!
//! ```text
//!                 PayloadSink (bounded mpsc)
//! ┌───────────┐      ┌─────────┐      ┌───────────────┐      ┌────────┐
//! │ Requester │─────▶│  queue  │─────▶│ dispatch loop │─────▶│ Events │──▶ listeners
//! │  (task)   │      └─────────┘      │ (owns Gateway)│      └────────┘
//! └───────────┘                       └───────────────┘
//!       ▲                                     ▲
//!       └──────────── CancellationToken ──────┘
//! ```
//!
//! The dispatch loop is the only owner of the [`Gateway`], so payloads are
//! handled one at a time and the entity cache needs no lock. Each
//! [`Client::connect`] starts from an empty cache.

use std::future::Future;
use std::sync::Arc;

use herald_core::{BoxedRequester, CancellationToken, PayloadSink, SessionOptions, TransportResult};
use herald_gateway::{EventKey, Events, Gateway, Intent, Intents};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::HeraldConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Settings for a [`Client`] beyond the token.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Scopes to declare. `None` declares whatever the current listeners need,
    /// or nothing if there are none.
    pub intents: Option<Intents>,
    /// Payloads the requester may queue ahead of the dispatch loop.
    pub queue_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            intents: None,
            queue_capacity: 256,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intents(mut self, intents: impl Into<Intents>) -> Self {
        self.intents = Some(intents.into());
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// A running session: the requester task and the dispatch task.
struct Session {
    shutdown: CancellationToken,
    /// Cancelled when the dispatch loop exits, for whatever reason.
    finished: CancellationToken,
    transport: JoinHandle<TransportResult<()>>,
    dispatch: JoinHandle<()>,
}

/// Connects a [`Requester`](herald_core::Requester) to a shared [`Events`] bundle.
///
/// ```rust,ignore
/// let client = Client::new(token, ClientOptions::new(), requester);
/// client.events().message_create.on(|event: &MessageCreate| {
///     println!("{}", event.message.content);
/// });
/// client.run().await?;
/// ```
pub struct Client {
    token: String,
    options: ClientOptions,
    requester: BoxedRequester,
    events: Arc<Events>,
    session: Mutex<Option<Session>>,
}

impl Client {
    pub fn new(token: impl Into<String>, options: ClientOptions, requester: BoxedRequester) -> Self {
        Self {
            token: token.into(),
            options,
            requester,
            events: Arc::new(Events::new()),
            session: Mutex::new(None),
        }
    }

    /// Builds a client from loaded configuration and initializes logging.
    ///
    /// Fails with [`RuntimeError::MissingToken`] if no token is configured.
    pub fn from_config(config: &HeraldConfig, requester: BoxedRequester) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);

        if config.token.is_empty() {
            return Err(RuntimeError::MissingToken);
        }

        let options = ClientOptions {
            intents: config.intents(),
            queue_capacity: config.dispatch.queue_capacity,
        };

        info!(
            requester = requester.name(),
            intents = ?options.intents,
            queue_capacity = options.queue_capacity,
            "Client initialized from configuration"
        );

        Ok(Self::new(config.token.clone(), options, requester))
    }

    /// The event bundle listeners subscribe on. Shared across sessions.
    pub fn events(&self) -> &Arc<Events> {
        &self.events
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Returns `true` while a session's dispatch loop is running.
    pub fn is_connected(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| !session.finished.is_cancelled())
    }

    /// Starts a session. Must be called from within a tokio runtime.
    pub fn connect(&self) -> RuntimeResult<()> {
        let mut slot = self.session.lock();
        if let Some(session) = slot.as_ref() {
            if !session.finished.is_cancelled() {
                return Err(RuntimeError::AlreadyConnected);
            }
            debug!("Previous session ended on its own, replacing it");
        }

        let mut session_options = SessionOptions::new(self.token.clone());
        if let Some(intents) = self.resolve_intents() {
            session_options = session_options.with_intents(intents.bits());
        }

        let (sink, rx) = PayloadSink::channel(self.options.queue_capacity);
        let shutdown = CancellationToken::new();
        let finished = CancellationToken::new();

        let requester = Arc::clone(&self.requester);
        let token = shutdown.clone();
        let transport = tokio::spawn(async move {
            let name = requester.name();
            let result = requester.run(session_options, sink, token).await;
            match &result {
                Ok(()) => debug!(requester = name, "Session ended"),
                Err(e) => error!(requester = name, error = %e, "Session failed"),
            }
            result
        });

        let gateway = Gateway::new(Arc::clone(&self.events));
        let dispatch = tokio::spawn(dispatch_loop(
            gateway,
            rx,
            shutdown.clone(),
            finished.clone(),
        ));

        info!(requester = self.requester.name(), "Client connected");

        *slot = Some(Session {
            shutdown,
            finished,
            transport,
            dispatch,
        });
        Ok(())
    }

    /// Waits until the current session's dispatch loop exits.
    ///
    /// Returns immediately when not connected.
    pub async fn wait(&self) {
        let finished = self
            .session
            .lock()
            .as_ref()
            .map(|session| session.finished.clone());
        if let Some(finished) = finished {
            finished.cancelled().await;
        }
    }

    /// Cancels the session and waits for both tasks to stop.
    ///
    /// Payloads still queued are discarded.
    pub async fn disconnect(&self) -> RuntimeResult<()> {
        let Some(session) = self.session.lock().take() else {
            warn!("Client is not connected");
            return Ok(());
        };

        session.shutdown.cancel();
        let transport = session.transport.await;
        let dispatch = session.dispatch.await;
        info!("Client disconnected");

        transport??;
        dispatch?;
        Ok(())
    }

    /// Connects, then disconnects once `shutdown` completes or the session
    /// ends on its own.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.connect()?;

        tokio::select! {
            _ = shutdown => debug!("Shutdown requested"),
            _ = self.wait() => debug!("Session finished"),
        }

        self.disconnect().await
    }

    /// Runs until Ctrl+C (or SIGTERM on unix).
    pub async fn run(&self) -> RuntimeResult<()> {
        self.run_until(wait_for_signal()).await
    }

    /// The scopes declared on connect.
    fn resolve_intents(&self) -> Option<Intents> {
        let Some(declared) = self.options.intents else {
            let required = self.events.required_intents();
            return (!required.is_empty()).then_some(required);
        };

        for &key in EventKey::ALL {
            if !self.events.has_listeners(key) {
                continue;
            }
            let mut unlocking = Intent::unlocking(key).peekable();
            if unlocking.peek().is_some() && !unlocking.any(|intent| declared.contains(intent)) {
                warn!(
                    event = %key,
                    intents = ?declared,
                    "Event has listeners but no declared intent unlocks it"
                );
            }
        }
        Some(declared)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.shutdown.cancel();
        }
    }
}

async fn dispatch_loop(
    mut gateway: Gateway,
    mut rx: tokio::sync::mpsc::Receiver<herald_core::Payload>,
    shutdown: CancellationToken,
    finished: CancellationToken,
) {
    let _finished = finished.drop_guard();
    let mut handled = 0usize;
    let mut published = 0usize;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            payload = rx.recv() => match payload {
                Some(payload) => {
                    handled += 1;
                    if gateway.handle(&payload) {
                        published += 1;
                    }
                }
                None => break,
            },
        }
    }

    debug!(handled, published, "Dispatch loop stopped");
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayRequester;
    use herald_core::Payload;
    use herald_gateway::events::{GuildBanAdd, GuildCreate, MessageCreate, Ready};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn frames() -> Vec<Payload> {
        vec![
            Payload::new("READY", json!({})),
            Payload::new("GUILD_CREATE", json!({ "id": "g1", "name": "home" })),
            Payload::new(
                "GUILD_BAN_ADD",
                json!({ "guild_id": "g1", "user": { "id": "u9", "username": "spam" } }),
            ),
            Payload::new(
                "MESSAGE_CREATE",
                json!({
                    "id": "m1",
                    "channel_id": "c1",
                    "author": { "id": "u1", "username": "a" },
                    "content": "hello"
                }),
            ),
        ]
    }

    #[tokio::test]
    async fn test_replay_in_order() {
        let requester = Arc::new(ReplayRequester::new(frames()));
        let client = Client::new("token", ClientOptions::new(), requester);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        client.events().ready.on(move |_: &Ready| log.lock().push("ready"));
        let log = Arc::clone(&seen);
        client
            .events()
            .guild_create
            .on(move |_: &GuildCreate| log.lock().push("guild"));
        let log = Arc::clone(&seen);
        client
            .events()
            .guild_ban_add
            .on(move |_: &GuildBanAdd| log.lock().push("ban"));
        let log = Arc::clone(&seen);
        client
            .events()
            .message_create
            .on(move |_: &MessageCreate| log.lock().push("message"));

        client.connect().unwrap();
        client.wait().await;
        assert!(!client.is_connected());
        client.disconnect().await.unwrap();

        assert_eq!(*seen.lock(), ["ready", "guild", "ban", "message"]);
    }

    #[tokio::test]
    async fn test_already_connected() {
        let requester = Arc::new(ReplayRequester::new(Vec::new()).hold_open());
        let client = Client::new("token", ClientOptions::new(), requester);

        client.connect().unwrap();
        assert!(client.is_connected());
        assert!(matches!(
            client.connect(),
            Err(RuntimeError::AlreadyConnected)
        ));

        client.disconnect().await.unwrap();
        assert!(!client.is_connected());

        // Disconnecting twice is a no-op.
        client.disconnect().await.unwrap();

        client.connect().unwrap();
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_explicit_intents_passed_to_requester() {
        let requester = Arc::new(ReplayRequester::new(Vec::new()));
        let options = ClientOptions::new()
            .with_intents(Intent::Guilds | Intent::GuildMessages)
            .with_queue_capacity(4);
        let client = Client::new("token", options, Arc::clone(&requester) as BoxedRequester);

        client.connect().unwrap();
        client.wait().await;
        client.disconnect().await.unwrap();

        let seen = requester.session_options().unwrap();
        assert_eq!(seen.token, "token");
        assert_eq!(
            seen.intents,
            Some((Intent::Guilds | Intent::GuildMessages).bits())
        );
    }

    #[tokio::test]
    async fn test_intents_derived_from_listeners() {
        let requester = Arc::new(ReplayRequester::new(Vec::new()));
        let client = Client::new(
            "token",
            ClientOptions::new(),
            Arc::clone(&requester) as BoxedRequester,
        );

        client.connect().unwrap();
        client.wait().await;
        client.disconnect().await.unwrap();
        assert_eq!(requester.session_options().unwrap().intents, None);

        client.events().guild_ban_add.on(|_: &GuildBanAdd| {});
        client.connect().unwrap();
        client.wait().await;
        client.disconnect().await.unwrap();
        assert_eq!(
            requester.session_options().unwrap().intents,
            Some(Intent::GuildBans.bit())
        );
    }

    #[tokio::test]
    async fn test_each_session_starts_with_empty_cache() {
        let ban = Payload::new(
            "GUILD_BAN_ADD",
            json!({ "guild_id": "g1", "user": { "id": "u9", "username": "spam" } }),
        );
        let requester = Arc::new(ReplayRequester::new(vec![ban]));
        let client = Client::new("token", ClientOptions::new(), requester);
        let bans = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&bans);
        client.events().guild_ban_add.on(move |_: &GuildBanAdd| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connect().unwrap();
        client.wait().await;
        client.disconnect().await.unwrap();
        assert_eq!(bans.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_until_returns_when_session_ends() {
        let requester = Arc::new(ReplayRequester::new(frames()));
        let client = Client::new("token", ClientOptions::new(), requester);
        client.run_until(std::future::pending()).await.unwrap();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_from_config_requires_token() {
        let requester: BoxedRequester = Arc::new(ReplayRequester::new(Vec::new()));
        let config = HeraldConfig::default();
        assert!(matches!(
            Client::from_config(&config, Arc::clone(&requester)),
            Err(RuntimeError::MissingToken)
        ));

        let config = HeraldConfig {
            token: "token".into(),
            intents: vec![Intent::Guilds],
            ..Default::default()
        };
        let client = Client::from_config(&config, requester).unwrap();
        assert_eq!(client.options().intents, Some(Intents::from(Intent::Guilds)));
        assert_eq!(client.options().queue_capacity, 256);
    }
}
