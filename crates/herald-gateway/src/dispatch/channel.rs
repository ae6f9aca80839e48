//! `CHANNEL_*` events.

use serde::Deserialize;

use herald_core::{DispatchResult, Payload};

use super::{drop_event, publish};
use crate::cache::EntityCache;
use crate::events::{ChannelCreate, ChannelDelete, ChannelPinsUpdate, ChannelUpdate, Events};
use crate::model::Channel;

/// A pins update either carries the whole channel or only its id.
#[derive(Deserialize)]
#[serde(untagged)]
enum PinsUpdateBody {
    Channel(Channel),
    Reference {
        channel_id: String,
        #[serde(default)]
        last_pin_timestamp: Option<String>,
    },
}

pub(super) fn handle(
    sub: &str,
    payload: &Payload,
    cache: &mut EntityCache,
    events: &Events,
) -> DispatchResult<bool> {
    match sub {
        "CREATE" => {
            let channel: Channel = payload.parse_body()?;
            store(cache, &channel);
            Ok(publish(events, ChannelCreate { channel }))
        }
        "UPDATE" => {
            let channel: Channel = payload.parse_body()?;
            store(cache, &channel);
            Ok(publish(events, ChannelUpdate { channel }))
        }
        "DELETE" => {
            let channel: Channel = payload.parse_body()?;
            evict(cache, &channel);
            Ok(publish(events, ChannelDelete { channel }))
        }
        "PINS_UPDATE" => pins_update(payload, cache, events),
        _ => drop_event("unhandled channel event"),
    }
}

fn pins_update(payload: &Payload, cache: &mut EntityCache, events: &Events) -> DispatchResult<bool> {
    let channel = match payload.parse_body()? {
        PinsUpdateBody::Channel(channel) => channel,
        PinsUpdateBody::Reference {
            channel_id,
            last_pin_timestamp,
        } => {
            let Some(cached) = cache.channel(&channel_id) else {
                return drop_event("channel not cached");
            };
            let mut channel = cached.clone();
            if let Some(text) = channel.as_text_mut() {
                text.text_mut().last_pin_timestamp = last_pin_timestamp;
            }
            channel
        }
    };
    store(cache, &channel);
    Ok(publish(events, ChannelPinsUpdate { channel }))
}

/// Mirrors a created or updated channel into the cache. Guild channels whose
/// guild is not cached are left out.
fn store(cache: &mut EntityCache, channel: &Channel) {
    if channel.as_dm().is_some() {
        cache.insert_dm_channel(channel.clone());
    } else if channel.guild_id().is_some() {
        cache.upsert_guild_channel(channel.clone());
    }
}

fn evict(cache: &mut EntityCache, channel: &Channel) {
    if channel.as_dm().is_some() {
        cache.remove_dm_channel(channel.id());
    } else {
        cache.remove_guild_channel(channel.id());
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{capture, dispatch, guild_body};
    use crate::cache::EntityCache;
    use crate::events::*;
    use crate::model::{Channel, ChannelType, OverwriteKind, TextChannel};
    use serde_json::json;

    #[test]
    fn test_text_channel_create() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let created = capture::<ChannelCreate>(&events);

        let published = dispatch(
            &mut cache,
            &events,
            "CHANNEL_CREATE",
            json!({
                "id": "5",
                "type": 0,
                "guild_id": "g1",
                "name": "general",
                "last_message_id": "99",
                "permission_overwrites": [
                    { "id": "r1", "type": 0, "allow": "1024", "deny": "0" },
                    { "id": "r1", "type": 0, "allow": "2048", "deny": "0" }
                ]
            }),
        );

        assert!(published);
        let created = created.lock().unwrap();
        assert_eq!(created.len(), 1);
        let channel = &created[0].channel;
        assert!(matches!(channel, Channel::GuildText(_)));
        assert_eq!(channel.id(), "5");
        assert_eq!(channel.as_text().unwrap().last_message_id(), Some("99"));

        let overwrites = channel.permission_overwrites();
        assert_eq!(overwrites.len(), 1);
        assert_eq!(overwrites["r1"].allow, 2048);
        assert_eq!(overwrites["r1"].kind, OverwriteKind::Role);

        // The guild was never seen, so nothing is cached.
        assert_eq!(cache.guild_id_for_channel("5"), None);
    }

    #[test]
    fn test_create_update_delete_keep_cache_in_step() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1"));

        let body = json!({ "id": "c9", "type": 5, "guild_id": "g1", "name": "news" });
        assert!(dispatch(&mut cache, &events, "CHANNEL_CREATE", body));
        assert_eq!(cache.guild_id_for_channel("c9"), Some("g1"));
        assert_eq!(cache.guild("g1").unwrap().channels().len(), 3);

        let body = json!({ "id": "c9", "type": 5, "guild_id": "g1", "name": "announcements" });
        assert!(dispatch(&mut cache, &events, "CHANNEL_UPDATE", body));
        let guild = cache.guild("g1").unwrap();
        assert_eq!(guild.channels().len(), 3);
        assert_eq!(
            guild.channel("c9").unwrap().guild_state().unwrap().name,
            "announcements"
        );

        let body = json!({ "id": "c9", "type": 5, "guild_id": "g1" });
        assert!(dispatch(&mut cache, &events, "CHANNEL_DELETE", body));
        assert_eq!(cache.guild_id_for_channel("c9"), None);
        assert_eq!(cache.guild("g1").unwrap().channels().len(), 2);
        cache.assert_consistent();
    }

    #[test]
    fn test_dm_channel_lifecycle() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let deleted = capture::<ChannelDelete>(&events);
        let body = json!({
            "id": "d1",
            "type": 1,
            "recipients": [{ "id": "u2", "username": "bo" }]
        });

        assert!(dispatch(&mut cache, &events, "CHANNEL_CREATE", body.clone()));
        assert_eq!(cache.dm_channel("d1").unwrap().recipients[0].username, "bo");

        assert!(dispatch(&mut cache, &events, "CHANNEL_DELETE", body));
        assert!(cache.dm_channel("d1").is_none());
        assert!(deleted.lock().unwrap()[0].channel.as_dm().is_some());
    }

    #[test]
    fn test_pins_update_with_full_channel() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let pins = capture::<ChannelPinsUpdate>(&events);

        let body = json!({ "id": "c3", "type": 4, "name": "category" });
        assert!(dispatch(&mut cache, &events, "CHANNEL_PINS_UPDATE", body));
        assert!(matches!(pins.lock().unwrap()[0].channel, Channel::GuildCategory(_)));
    }

    #[test]
    fn test_pins_update_by_reference() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let pins = capture::<ChannelPinsUpdate>(&events);
        let body = json!({ "channel_id": "c1", "last_pin_timestamp": "2021-05-01T00:00:00Z" });

        assert!(!dispatch(&mut cache, &events, "CHANNEL_PINS_UPDATE", body.clone()));

        dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1"));
        assert!(dispatch(&mut cache, &events, "CHANNEL_PINS_UPDATE", body));

        let pins = pins.lock().unwrap();
        let text = pins[0].channel.as_text().unwrap();
        assert_eq!(text.last_pin_timestamp(), Some("2021-05-01T00:00:00Z"));
        let cached = cache.channel("c1").unwrap().as_text().unwrap();
        assert_eq!(cached.last_pin_timestamp(), Some("2021-05-01T00:00:00Z"));
    }

    #[test]
    fn test_unknown_subtype_falls_back() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let created = capture::<ChannelCreate>(&events);

        assert!(dispatch(&mut cache, &events, "CHANNEL_CREATE", json!({ "id": "t1", "type": 11 })));
        assert!(dispatch(&mut cache, &events, "CHANNEL_CREATE", json!({ "id": "t2", "type": 300 })));

        let created = created.lock().unwrap();
        assert!(matches!(created[0].channel, Channel::Other(_)));
        assert!(matches!(created[1].channel, Channel::Other(_)));
        assert_eq!(created[1].channel.channel_type(), ChannelType::Unknown(300));
    }
}
