//! Payload classification and category dispatch.
//!
//! ```text
//!                      ┌─ "CHANNEL_*" ──▶ channel::handle
//!                      ├─ "GUILD_*"   ──▶ guild::handle ─┬─ "MEMBER_*" ─▶ member
//! Payload ─▶ handle_event                                └─ "ROLE_*"   ─▶ role
//!                      ├─ "MESSAGE_*" ──▶ message::handle
//!                      ├─ "READY"        ──▶ ready
//!                      ├─ "TYPING_START" ──▶ typing_start
//!                      └─ anything else, or no tag ──▶ ignored
//! ```
//!
//! Dispatchers return `Ok(true)` when they published, `Ok(false)` when the
//! payload was dropped on purpose (unknown sub-tag, uncached reference,
//! rejected partial body) and `Err` when the body did not match its schema.

mod channel;
mod guild;
mod message;

use serde::Deserialize;
use tracing::{Level, debug, span, trace, warn};

use herald_core::{DispatchResult, Payload};

use crate::cache::EntityCache;
use crate::events::{EventRecord, Events, Ready, TypingStart};

/// Routes one payload to its category dispatcher.
///
/// Returns `true` if an event was published. Malformed bodies are logged at
/// `warn` and dropped.
pub fn handle_event(payload: &Payload, cache: &mut EntityCache, events: &Events) -> bool {
    let Some(kind) = payload.kind() else {
        trace!("Ignoring payload without event tag");
        return false;
    };

    let span = span!(Level::DEBUG, "dispatch", event = %kind);
    let _enter = span.enter();

    let result = if let Some(sub) = kind.strip_prefix("CHANNEL_") {
        channel::handle(sub, payload, cache, events)
    } else if let Some(sub) = kind.strip_prefix("GUILD_") {
        guild::handle(sub, payload, cache, events)
    } else if let Some(sub) = kind.strip_prefix("MESSAGE_") {
        message::handle(sub, payload, cache, events)
    } else {
        match kind {
            "READY" => Ok(publish(events, Ready)),
            "TYPING_START" => typing_start(payload, cache, events),
            _ => {
                trace!("Ignoring unhandled event");
                Ok(false)
            }
        }
    };

    match result {
        Ok(published) => published,
        Err(e) => {
            warn!(error = %e, "Dropping malformed payload");
            false
        }
    }
}

/// Emits `record` and reports that something was published.
pub(crate) fn publish<R: EventRecord>(events: &Events, record: R) -> bool {
    let listeners = events.emit(&record);
    debug!(event = R::KEY.as_str(), listeners, "Published event");
    true
}

/// Logs a deliberate drop and reports that nothing was published.
pub(crate) fn drop_event(reason: &str) -> DispatchResult<bool> {
    trace!(reason, "Dropping event");
    Ok(false)
}

#[derive(Deserialize)]
struct TypingStartBody {
    channel_id: String,
    user_id: String,
    #[serde(default)]
    timestamp: u64,
}

fn typing_start(payload: &Payload, cache: &EntityCache, events: &Events) -> DispatchResult<bool> {
    let body: TypingStartBody = payload.parse_body()?;
    let Some(channel) = cache.channel(&body.channel_id) else {
        return drop_event("channel not cached");
    };
    let record = TypingStart {
        channel: channel.clone(),
        user_id: body.user_id,
        timestamp: body.timestamp,
    };
    Ok(publish(events, record))
}
