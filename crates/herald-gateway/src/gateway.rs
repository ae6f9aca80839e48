//! The cache owner that payloads are fed through.

use std::sync::Arc;

use herald_core::Payload;

use crate::cache::EntityCache;
use crate::dispatch::handle_event;
use crate::events::Events;

/// Owns the entity cache and publishes onto a shared [`Events`] bundle.
///
/// `handle` takes `&mut self`, so payloads are processed one at a time and
/// events fire in delivery order.
#[derive(Debug)]
pub struct Gateway {
    cache: EntityCache,
    events: Arc<Events>,
}

impl Gateway {
    pub fn new(events: Arc<Events>) -> Self {
        Self {
            cache: EntityCache::new(),
            events,
        }
    }

    /// Processes one payload. Returns `true` if an event was published.
    pub fn handle(&mut self, payload: &Payload) -> bool {
        handle_event(payload, &mut self.cache, &self.events)
    }

    pub fn events(&self) -> &Arc<Events> {
        &self.events
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Forgets every cached entity, e.g. before a fresh session.
    pub fn reset(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{GuildBanAdd, GuildCreate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use serde_json::json;

    #[test]
    fn test_events_shared_with_application() {
        let events = Arc::new(Events::new());
        let mut gateway = Gateway::new(Arc::clone(&events));
        let joined = Arc::new(AtomicUsize::new(0));
        let banned = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&joined);
        events.guild_create.on(move |_: &GuildCreate| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&banned);
        events.guild_ban_add.on(move |_: &GuildBanAdd| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let ban = Payload::new(
            "GUILD_BAN_ADD",
            json!({ "guild_id": "g1", "user": { "id": "u1", "username": "x" } }),
        );
        assert!(!gateway.handle(&ban));
        assert!(gateway.handle(&Payload::new("GUILD_CREATE", json!({ "id": "g1" }))));
        assert!(gateway.handle(&ban));

        assert_eq!(joined.load(Ordering::SeqCst), 1);
        assert_eq!(banned.load(Ordering::SeqCst), 1);
        assert!(gateway.cache().contains_guild("g1"));

        gateway.reset();
        assert!(!gateway.handle(&ban));
    }
}
