//! `GUILD_*` events.
//!
//! Member and role events are split out into their own sub-dispatchers; the
//! rest are handled here. Every event except `GUILD_CREATE` and `GUILD_DELETE`
//! needs the guild in the cache and is dropped otherwise.

mod member;
mod role;

use std::sync::Arc;

use serde::Deserialize;

use herald_core::{DispatchResult, Payload};

use super::{drop_event, publish};
use crate::cache::EntityCache;
use crate::events::{
    Events, GuildBanAdd, GuildBanRemove, GuildCreate, GuildDelete, GuildEmojisUpdate,
    GuildIntegrationsUpdate, GuildUpdate,
};
use crate::model::{Guild, GuildData, GuildEmoji, User};

#[derive(Deserialize)]
struct BanBody {
    guild_id: String,
    user: User,
}

#[derive(Deserialize)]
struct EmojisBody {
    guild_id: String,
    emojis: Vec<GuildEmoji>,
}

#[derive(Deserialize)]
struct GuildRef {
    guild_id: String,
}

pub(super) fn handle(
    sub: &str,
    payload: &Payload,
    cache: &mut EntityCache,
    events: &Events,
) -> DispatchResult<bool> {
    if let Some(sub) = sub.strip_prefix("MEMBER_") {
        return member::handle(sub, payload, cache, events);
    }
    if let Some(sub) = sub.strip_prefix("ROLE_") {
        return role::handle(sub, payload, cache, events);
    }

    match sub {
        "CREATE" => {
            let guild: Guild = payload.parse_body()?;
            let guild = cache.insert_guild(guild);
            Ok(publish(events, GuildCreate { guild }))
        }
        "UPDATE" => {
            let data: GuildData = payload.parse_body()?;
            let Some(previous) = cache.guild(&data.id).cloned() else {
                return drop_event("guild not cached");
            };
            let guild = data.into_guild(Some(&*previous));
            let guild = cache.insert_guild(guild);
            Ok(publish(events, GuildUpdate { guild }))
        }
        "DELETE" => {
            let guild: Guild = payload.parse_body()?;
            cache.remove_guild(&guild.id);
            Ok(publish(
                events,
                GuildDelete {
                    guild: Arc::new(guild),
                },
            ))
        }
        "BAN_ADD" | "BAN_REMOVE" => {
            let body: BanBody = payload.parse_body()?;
            let Some(guild) = cache.guild(&body.guild_id).cloned() else {
                return drop_event("guild not cached");
            };
            let published = if sub == "BAN_ADD" {
                publish(events, GuildBanAdd { guild, user: body.user })
            } else {
                publish(events, GuildBanRemove { guild, user: body.user })
            };
            Ok(published)
        }
        "EMOJIS_UPDATE" => {
            let body: EmojisBody = payload.parse_body()?;
            let emojis = body.emojis;
            let Some((guild, ())) =
                cache.update_guild(&body.guild_id, |g| g.set_emojis(emojis.clone()))
            else {
                return drop_event("guild not cached");
            };
            Ok(publish(events, GuildEmojisUpdate { guild, emojis }))
        }
        "INTEGRATIONS_UPDATE" => {
            let body: GuildRef = payload.parse_body()?;
            let Some(guild) = cache.guild(&body.guild_id).cloned() else {
                return drop_event("guild not cached");
            };
            Ok(publish(events, GuildIntegrationsUpdate { guild }))
        }
        _ => drop_event("unhandled guild event"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{capture, dispatch, guild_body};
    use crate::cache::EntityCache;
    use crate::events::*;
    use crate::model::Channel;
    use serde_json::json;

    #[test]
    fn test_ban_dropped_until_guild_known() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let bans = capture::<GuildBanAdd>(&events);
        let ban = json!({ "guild_id": "g1", "user": { "id": "u7", "username": "spam" } });

        assert!(!dispatch(&mut cache, &events, "GUILD_BAN_ADD", ban.clone()));
        assert!(bans.lock().unwrap().is_empty());

        assert!(dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1")));
        assert!(dispatch(&mut cache, &events, "GUILD_BAN_ADD", ban));

        let bans = bans.lock().unwrap();
        assert_eq!(bans.len(), 1);
        assert_eq!(bans[0].guild.id, "g1");
        assert_eq!(bans[0].user.id, "u7");
    }

    #[test]
    fn test_ban_remove() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let removed = capture::<GuildBanRemove>(&events);
        dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1"));

        let ban = json!({ "guild_id": "g1", "user": { "id": "u7", "username": "spam" } });
        assert!(dispatch(&mut cache, &events, "GUILD_BAN_REMOVE", ban));
        assert_eq!(removed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_create_keeps_channels_of_unknown_type() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let mut body = guild_body("g1");
        body["channels"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "id": "c9", "type": 256 }));

        assert!(dispatch(&mut cache, &events, "GUILD_CREATE", body));
        let guild = cache.guild("g1").unwrap();
        assert_eq!(guild.channels().len(), 3);
        assert!(matches!(guild.channel("c9"), Some(Channel::Other(_))));
        assert_eq!(cache.guild_id_for_channel("c9"), Some("g1"));
    }

    #[test]
    fn test_update_of_uncached_guild_is_dropped() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let updated = capture::<GuildUpdate>(&events);

        let body = json!({ "id": "g9", "name": "ghost" });
        assert!(!dispatch(&mut cache, &events, "GUILD_UPDATE", body));
        assert!(updated.lock().unwrap().is_empty());
        assert!(!cache.contains_guild("g9"));
        assert_eq!(cache.guild_count(), 0);
    }

    #[test]
    fn test_guild_lifecycle() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let created = capture::<GuildCreate>(&events);
        let deleted = capture::<GuildDelete>(&events);
        let integrations = capture::<GuildIntegrationsUpdate>(&events);

        assert!(dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1")));
        assert_eq!(created.lock().unwrap()[0].guild.channels().len(), 2);
        assert_eq!(cache.guild_id_for_channel("c1"), Some("g1"));

        assert!(dispatch(
            &mut cache,
            &events,
            "GUILD_INTEGRATIONS_UPDATE",
            json!({ "guild_id": "g1" })
        ));
        assert_eq!(integrations.lock().unwrap().len(), 1);

        assert!(dispatch(
            &mut cache,
            &events,
            "GUILD_DELETE",
            json!({ "id": "g1", "unavailable": true })
        ));
        let deleted = deleted.lock().unwrap();
        assert_eq!(deleted[0].guild.id, "g1");
        assert!(deleted[0].guild.unavailable);
        assert!(!cache.contains_guild("g1"));
        assert_eq!(cache.guild_id_for_channel("c1"), None);

        assert!(!dispatch(
            &mut cache,
            &events,
            "GUILD_INTEGRATIONS_UPDATE",
            json!({ "guild_id": "g1" })
        ));
        assert_eq!(integrations.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_of_unknown_guild_still_publishes() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let deleted = capture::<GuildDelete>(&events);

        assert!(dispatch(&mut cache, &events, "GUILD_DELETE", json!({ "id": "g5" })));
        assert_eq!(deleted.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_update_keeps_cached_collections() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let updated = capture::<GuildUpdate>(&events);
        dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1"));

        let body = json!({ "id": "g1", "name": "Renamed", "owner_id": "u1" });
        assert!(dispatch(&mut cache, &events, "GUILD_UPDATE", body));

        let updated = updated.lock().unwrap();
        let guild = &updated[0].guild;
        assert_eq!(guild.name, "Renamed");
        assert_eq!(guild.owner_id.as_deref(), Some("u1"));
        assert_eq!(guild.channels().len(), 2);
        assert!(guild.member("u1").is_some());
        assert_eq!(cache.guild("g1").unwrap().name, "Renamed");
        cache.assert_consistent();
    }

    #[test]
    fn test_emojis_update_replaces_cached_list() {
        let events = Events::new();
        let mut cache = EntityCache::new();
        let emojis = capture::<GuildEmojisUpdate>(&events);
        let body = json!({
            "guild_id": "g1",
            "emojis": [{ "id": "e1", "name": "wave" }, { "id": "e2", "name": "blob" }]
        });

        assert!(!dispatch(&mut cache, &events, "GUILD_EMOJIS_UPDATE", body.clone()));

        dispatch(&mut cache, &events, "GUILD_CREATE", guild_body("g1"));
        assert!(dispatch(&mut cache, &events, "GUILD_EMOJIS_UPDATE", body));

        let emojis = emojis.lock().unwrap();
        assert_eq!(emojis[0].emojis.len(), 2);
        assert_eq!(emojis[0].guild.emojis().len(), 2);
        assert_eq!(cache.guild("g1").unwrap().emojis()[1].name.as_deref(), Some("blob"));
    }
}
