//! `MESSAGE_*` events.

use serde::Deserialize;

use herald_core::{DispatchResult, Payload};

use super::{drop_event, publish};
use crate::cache::EntityCache;
use crate::events::{
    Events, MessageCreate, MessageDelete, MessageDeleteBulk, MessageReactionAdd,
    MessageReactionRemove, MessageReactionRemoveAll, MessageUpdate,
};
use crate::model::{Message, ReactionEmoji};

#[derive(Deserialize)]
struct DeleteBody {
    id: String,
    channel_id: String,
}

#[derive(Deserialize)]
struct DeleteBulkBody {
    ids: Vec<String>,
    channel_id: String,
}

#[derive(Deserialize)]
struct ReactionBody {
    user_id: String,
    channel_id: String,
    message_id: String,
    emoji: ReactionEmoji,
}

#[derive(Deserialize)]
struct ReactionRemoveAllBody {
    channel_id: String,
    message_id: String,
}

pub(super) fn handle(
    sub: &str,
    payload: &Payload,
    cache: &mut EntityCache,
    events: &Events,
) -> DispatchResult<bool> {
    match sub {
        "CREATE" => {
            let message: Message = payload.parse_body()?;
            Ok(publish(events, MessageCreate { message }))
        }
        "UPDATE" => {
            // Embed-only updates arrive without an author.
            if !payload.has_field("author") {
                return drop_event("message update without author");
            }
            let message: Message = payload.parse_body()?;
            Ok(publish(events, MessageUpdate { message }))
        }
        "DELETE" => {
            let body: DeleteBody = payload.parse_body()?;
            let record = MessageDelete {
                message_id: body.id,
                channel_id: body.channel_id,
            };
            Ok(publish(events, record))
        }
        "DELETE_BULK" => {
            let body: DeleteBulkBody = payload.parse_body()?;
            let record = MessageDeleteBulk {
                message_ids: body.ids,
                channel_id: body.channel_id,
            };
            Ok(publish(events, record))
        }
        "REACTION_ADD" | "REACTION_REMOVE" => {
            let body: ReactionBody = payload.parse_body()?;
            let Some(channel) = cache.channel(&body.channel_id).cloned() else {
                return drop_event("channel not cached");
            };
            let published = if sub == "REACTION_ADD" {
                publish(
                    events,
                    MessageReactionAdd {
                        channel,
                        message_id: body.message_id,
                        user_id: body.user_id,
                        emoji: body.emoji,
                    },
                )
            } else {
                publish(
                    events,
                    MessageReactionRemove {
                        channel,
                        message_id: body.message_id,
                        user_id: body.user_id,
                        emoji: body.emoji,
                    },
                )
            };
            Ok(published)
        }
        "REACTION_REMOVE_ALL" => {
            let body: ReactionRemoveAllBody = payload.parse_body()?;
            let Some(channel) = cache.channel(&body.channel_id).cloned() else {
                return drop_event("channel not cached");
            };
            let record = MessageReactionRemoveAll {
                channel,
                message_id: body.message_id,
            };
            Ok(publish(events, record))
        }
        _ => drop_event("unhandled message event"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{capture, dispatch, guild_body};
    use crate::cache::EntityCache;
    use crate::events::*;
    use crate::model::ReactionEmoji;
    use serde_json::json;

    fn message_body() -> serde_json::Value {
        json!({
            "id": "m1",
            "channel_id": "c1",
            "guild_id": "g1",
            "author": { "id": "u1", "username": "ana" },
            "content": "hello",
            "timestamp": "2020-01-01T00:00:00Z",
            "mentions": [{ "id": "u2", "username": "bo" }]
        })
    }

    #[test]
    fn test_create_needs_no_cache() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let created = capture::<MessageCreate>(&events);

        assert!(dispatch(&mut cache, &events, "MESSAGE_CREATE", message_body()));

        let created = created.lock().unwrap();
        assert_eq!(created[0].message.content, "hello");
        assert_eq!(created[0].message.author.username, "ana");
        assert!(created[0].message.mentions_user("u2"));
    }

    #[test]
    fn test_failing_subscriber_does_not_block_siblings() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        events
            .message_create
            .on(|_: &MessageCreate| panic!("subscriber failure"));
        let created = capture::<MessageCreate>(&events);

        assert!(dispatch(&mut cache, &events, "MESSAGE_CREATE", message_body()));
        assert_eq!(created.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_update_requires_author() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let updates = capture::<MessageUpdate>(&events);

        let partial = json!({ "id": "m1", "channel_id": "c1", "embeds": [] });
        assert!(!dispatch(&mut cache, &events, "MESSAGE_UPDATE", partial));
        let null_author = json!({ "id": "m1", "channel_id": "c1", "author": null });
        assert!(!dispatch(&mut cache, &events, "MESSAGE_UPDATE", null_author));
        assert!(updates.lock().unwrap().is_empty());

        assert!(dispatch(&mut cache, &events, "MESSAGE_UPDATE", message_body()));
        assert_eq!(updates.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_carries_identifiers_only() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let deleted = capture::<MessageDelete>(&events);
        let bulk = capture::<MessageDeleteBulk>(&events);

        let body = json!({ "id": "m1", "channel_id": "c1" });
        assert!(dispatch(&mut cache, &events, "MESSAGE_DELETE", body));
        let body = json!({ "ids": ["m1", "m2"], "channel_id": "c1", "guild_id": "g1" });
        assert!(dispatch(&mut cache, &events, "MESSAGE_DELETE_BULK", body));

        assert_eq!(
            deleted.lock().unwrap()[0],
            MessageDelete {
                message_id: "m1".into(),
                channel_id: "c1".into()
            }
        );
        assert_eq!(
            bulk.lock().unwrap()[0],
            MessageDeleteBulk {
                message_ids: vec!["m1".into(), "m2".into()],
                channel_id: "c1".into()
            }
        );
    }

    #[test]
    fn test_reactions_resolve_channel() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let added = capture::<MessageReactionAdd>(&events);
        let removed = capture::<MessageReactionRemove>(&events);
        let cleared = capture::<MessageReactionRemoveAll>(&events);
        let body = json!({
            "user_id": "u1",
            "channel_id": "c1",
            "message_id": "m1",
            "guild_id": "g1",
            "emoji": { "id": null, "name": "👍" }
        });

        assert!(!dispatch(&mut cache, &events, "MESSAGE_REACTION_ADD", body.clone()));

        dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1"));
        assert!(dispatch(&mut cache, &events, "MESSAGE_REACTION_ADD", body.clone()));
        assert!(dispatch(&mut cache, &events, "MESSAGE_REACTION_REMOVE", body));
        assert!(dispatch(
            &mut cache,
            &events,
            "MESSAGE_REACTION_REMOVE_ALL",
            json!({ "channel_id": "c1", "message_id": "m1" })
        ));

        let added = added.lock().unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].channel.id(), "c1");
        assert_eq!(
            added[0].emoji,
            ReactionEmoji::Standard {
                name: "👍".to_string()
            }
        );
        assert_eq!(removed.lock().unwrap().len(), 1);
        assert_eq!(cleared.lock().unwrap()[0].message_id, "m1");
    }

    #[test]
    fn test_reaction_in_dm_channel() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let added = capture::<MessageReactionAdd>(&events);
        dispatch(&mut cache, &events, "CHANNEL_CREATE", json!({ "id": "d1", "type": 1 }));

        let body = json!({
            "user_id": "u1",
            "channel_id": "d1",
            "message_id": "m1",
            "emoji": { "id": "41", "name": "blob" }
        });
        assert!(dispatch(&mut cache, &events, "MESSAGE_REACTION_ADD", body));
        assert!(added.lock().unwrap()[0].channel.as_dm().is_some());
    }
}
