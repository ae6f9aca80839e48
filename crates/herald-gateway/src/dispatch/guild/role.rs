//! `GUILD_ROLE_*` events.

use serde::Deserialize;

use herald_core::{DispatchResult, Payload};

use super::super::{drop_event, publish};
use crate::cache::EntityCache;
use crate::events::{Events, GuildRoleCreate, GuildRoleDelete, GuildRoleUpdate};
use crate::model::Role;

#[derive(Deserialize)]
struct RoleBody {
    guild_id: String,
    role: Role,
}

/// Deletions usually carry only `role_id`.
#[derive(Deserialize)]
struct RoleDeleteBody {
    guild_id: String,
    #[serde(default)]
    role_id: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

pub(super) fn handle(
    sub: &str,
    payload: &Payload,
    cache: &mut EntityCache,
    events: &Events,
) -> DispatchResult<bool> {
    match sub {
        "CREATE" | "UPDATE" => {
            let body: RoleBody = payload.parse_body()?;
            let role = body.role;
            let Some((guild, _)) = cache.update_guild(&body.guild_id, |g| g.upsert_role(role.clone()))
            else {
                return drop_event("guild not cached");
            };
            let published = if sub == "CREATE" {
                publish(events, GuildRoleCreate { guild, role })
            } else {
                publish(events, GuildRoleUpdate { guild, role })
            };
            Ok(published)
        }
        "DELETE" => {
            let body: RoleDeleteBody = payload.parse_body()?;
            let Some(role_id) = body
                .role
                .as_ref()
                .map(|role| role.id.clone())
                .or(body.role_id)
            else {
                return drop_event("role delete without role id");
            };
            let Some((guild, removed)) =
                cache.update_guild(&body.guild_id, |g| g.remove_role(&role_id))
            else {
                return drop_event("guild not cached");
            };
            match body.role.or(removed) {
                Some(role) => Ok(publish(events, GuildRoleDelete { guild, role })),
                None => drop_event("role not cached"),
            }
        }
        _ => drop_event("unhandled role event"),
    }
}
