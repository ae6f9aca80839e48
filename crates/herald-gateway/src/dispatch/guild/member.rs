//! `GUILD_MEMBER_*` events.

use serde::Deserialize;

use herald_core::{DispatchResult, Payload};

use super::super::{drop_event, publish};
use crate::cache::EntityCache;
use crate::events::{Events, GuildMemberAdd, GuildMemberRemove, GuildMemberUpdate};
use crate::model::{GuildMember, User};

#[derive(Deserialize)]
struct MemberAddBody {
    guild_id: String,
    #[serde(flatten)]
    member: GuildMember,
}

/// Update bodies may omit fields that did not change.
#[derive(Deserialize)]
struct MemberUpdateBody {
    guild_id: String,
    user: User,
    #[serde(default)]
    roles: Option<Vec<String>>,
    /// Outer `None` when the key is absent, `Some(None)` when it is `null`.
    #[serde(default, deserialize_with = "present")]
    nick: Option<Option<String>>,
    #[serde(default)]
    joined_at: Option<String>,
    #[serde(default)]
    deaf: Option<bool>,
    #[serde(default)]
    mute: Option<bool>,
}

impl MemberUpdateBody {
    fn apply(self, previous: Option<&GuildMember>) -> GuildMember {
        GuildMember {
            joined_at: self
                .joined_at
                .or_else(|| previous.and_then(|m| m.joined_at.clone())),
            deaf: self.deaf.or(previous.map(|m| m.deaf)).unwrap_or_default(),
            mute: self.mute.or(previous.map(|m| m.mute)).unwrap_or_default(),
            guild_id: Some(self.guild_id),
            user: self.user,
            nick: self
                .nick
                .unwrap_or_else(|| previous.and_then(|m| m.nick.clone())),
            roles: self
                .roles
                .or_else(|| previous.map(|m| m.roles.clone()))
                .unwrap_or_default(),
        }
    }
}

/// Marks a key as present, keeping an explicit `null` distinguishable from absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
struct MemberRemoveBody {
    guild_id: String,
    user: User,
}

pub(super) fn handle(
    sub: &str,
    payload: &Payload,
    cache: &mut EntityCache,
    events: &Events,
) -> DispatchResult<bool> {
    match sub {
        "ADD" => {
            let body: MemberAddBody = payload.parse_body()?;
            let mut member = body.member;
            member.guild_id = Some(body.guild_id.clone());
            let Some((guild, _)) =
                cache.update_guild(&body.guild_id, |g| g.upsert_member(member.clone()))
            else {
                return drop_event("guild not cached");
            };
            Ok(publish(events, GuildMemberAdd { guild, member }))
        }
        "UPDATE" => {
            let body: MemberUpdateBody = payload.parse_body()?;
            let guild_id = body.guild_id.clone();
            let Some(cached) = cache.guild(&guild_id) else {
                return drop_event("guild not cached");
            };
            let old_member = cached.member(&body.user.id).cloned();
            let member = body.apply(old_member.as_ref());

            let Some((guild, _)) = cache.update_guild(&guild_id, |g| g.upsert_member(member.clone()))
            else {
                return drop_event("guild not cached");
            };
            Ok(publish(
                events,
                GuildMemberUpdate {
                    guild,
                    member,
                    old_member,
                },
            ))
        }
        "REMOVE" => {
            let body: MemberRemoveBody = payload.parse_body()?;
            let Some((guild, removed)) =
                cache.update_guild(&body.guild_id, |g| g.remove_member(&body.user.id))
            else {
                return drop_event("guild not cached");
            };
            let member =
                removed.unwrap_or_else(|| GuildMember::from_user(body.user, body.guild_id));
            Ok(publish(events, GuildMemberRemove { guild, member }))
        }
        _ => drop_event("unhandled member event"),
    }
}
