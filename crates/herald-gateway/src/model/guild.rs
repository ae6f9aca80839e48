//! Guilds.

use std::collections::HashMap;

use serde::Deserialize;

use super::channel::Channel;
use super::emoji::GuildEmoji;
use super::member::GuildMember;
use super::role::Role;

/// A guild body as sent on the wire.
///
/// Collections are optional so that a partial update can tell "absent" from
/// "empty".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub icon: Option<String>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub unavailable: bool,
    pub member_count: Option<u64>,
    pub channels: Option<Vec<Channel>>,
    pub roles: Option<Vec<Role>>,
    pub members: Option<Vec<GuildMember>>,
    pub emojis: Option<Vec<GuildEmoji>>,
}

/// A guild and the entities nested in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "GuildData")]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub owner_id: Option<String>,
    /// Whether the guild is in an outage.
    pub unavailable: bool,
    pub member_count: Option<u64>,
    channels: Vec<Channel>,
    roles: HashMap<String, Role>,
    members: HashMap<String, GuildMember>,
    emojis: Vec<GuildEmoji>,
}

impl From<GuildData> for Guild {
    fn from(data: GuildData) -> Self {
        data.into_guild(None)
    }
}

impl GuildData {
    /// Builds a guild, taking any collection the body omits from `previous`.
    pub fn into_guild(self, previous: Option<&Guild>) -> Guild {
        let mut guild = Guild {
            name: self
                .name
                .or_else(|| previous.map(|g| g.name.clone()))
                .unwrap_or_default(),
            icon: self.icon,
            owner_id: self.owner_id,
            unavailable: self.unavailable,
            member_count: self.member_count.or_else(|| previous.and_then(|g| g.member_count)),
            channels: match (self.channels, previous) {
                (Some(channels), _) => channels,
                (None, Some(previous)) => previous.channels.clone(),
                (None, None) => Vec::new(),
            },
            roles: match (self.roles, previous) {
                (Some(roles), _) => roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
                (None, Some(previous)) => previous.roles.clone(),
                (None, None) => HashMap::new(),
            },
            members: match (self.members, previous) {
                (Some(members), _) => members
                    .into_iter()
                    .map(|m| (m.user.id.clone(), m))
                    .collect(),
                (None, Some(previous)) => previous.members.clone(),
                (None, None) => HashMap::new(),
            },
            emojis: match (self.emojis, previous) {
                (Some(emojis), _) => emojis,
                (None, Some(previous)) => previous.emojis.clone(),
                (None, None) => Vec::new(),
            },
            id: self.id,
        };

        for channel in &mut guild.channels {
            channel.set_guild_id(&guild.id);
        }
        for member in guild.members.values_mut() {
            member.guild_id = Some(guild.id.clone());
        }
        guild
    }
}

impl Guild {
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id() == channel_id)
    }

    pub fn roles(&self) -> &HashMap<String, Role> {
        &self.roles
    }

    pub fn role(&self, role_id: &str) -> Option<&Role> {
        self.roles.get(role_id)
    }

    /// Members keyed by user id.
    pub fn members(&self) -> &HashMap<String, GuildMember> {
        &self.members
    }

    pub fn member(&self, user_id: &str) -> Option<&GuildMember> {
        self.members.get(user_id)
    }

    pub fn emojis(&self) -> &[GuildEmoji] {
        &self.emojis
    }

    // Channel mutation goes through the cache so the channel index stays in
    // step with the guild's channel list.

    pub(crate) fn upsert_channel(&mut self, mut channel: Channel) -> Option<Channel> {
        channel.set_guild_id(&self.id);
        match self.channels.iter_mut().find(|c| c.id() == channel.id()) {
            Some(slot) => Some(std::mem::replace(slot, channel)),
            None => {
                self.channels.push(channel);
                None
            }
        }
    }

    pub(crate) fn remove_channel(&mut self, channel_id: &str) -> Option<Channel> {
        let index = self.channels.iter().position(|c| c.id() == channel_id)?;
        Some(self.channels.remove(index))
    }

    pub(crate) fn upsert_role(&mut self, role: Role) -> Option<Role> {
        self.roles.insert(role.id.clone(), role)
    }

    pub(crate) fn remove_role(&mut self, role_id: &str) -> Option<Role> {
        self.roles.remove(role_id)
    }

    pub(crate) fn upsert_member(&mut self, mut member: GuildMember) -> Option<GuildMember> {
        member.guild_id = Some(self.id.clone());
        self.members.insert(member.user.id.clone(), member)
    }

    pub(crate) fn remove_member(&mut self, user_id: &str) -> Option<GuildMember> {
        self.members.remove(user_id)
    }

    pub(crate) fn set_emojis(&mut self, emojis: Vec<GuildEmoji>) {
        self.emojis = emojis;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Guild {
        serde_json::from_value(json!({
            "id": "g1",
            "name": "Lounge",
            "channels": [
                { "id": "c1", "type": 0, "name": "general" },
                { "id": "c2", "type": 2, "name": "voice" }
            ],
            "roles": [{ "id": "r1", "name": "mod", "permissions": "8" }],
            "members": [{ "user": { "id": "u1", "username": "ana" }, "roles": ["r1"] }],
            "emojis": [{ "id": "e1", "name": "wave" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_nested_entities_are_stamped() {
        let guild = sample();
        assert_eq!(guild.channels().len(), 2);
        assert!(guild.channels().iter().all(|c| c.guild_id() == Some("g1")));
        assert_eq!(guild.member("u1").unwrap().guild_id.as_deref(), Some("g1"));
        assert_eq!(guild.role("r1").unwrap().permissions, 8);
        assert_eq!(guild.emojis().len(), 1);
    }

    #[test]
    fn test_minimal_body() {
        let guild: Guild = serde_json::from_value(json!({ "id": "g9", "unavailable": true })).unwrap();
        assert_eq!(guild.id, "g9");
        assert!(guild.unavailable);
        assert!(guild.name.is_empty());
        assert!(guild.channels().is_empty());
    }

    #[test]
    fn test_update_keeps_absent_collections() {
        let previous = sample();
        let data: GuildData =
            serde_json::from_value(json!({ "id": "g1", "name": "Renamed", "roles": [] })).unwrap();
        let updated = data.into_guild(Some(&previous));

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.channels(), previous.channels());
        assert_eq!(updated.members(), previous.members());
        assert!(updated.roles().is_empty());
    }

    #[test]
    fn test_upsert_channel_replaces_in_place() {
        let mut guild = sample();
        let renamed: Channel =
            serde_json::from_value(json!({ "id": "c1", "type": 0, "name": "chat" })).unwrap();
        let old = guild.upsert_channel(renamed).unwrap();

        assert_eq!(old.guild_state().unwrap().name, "general");
        assert_eq!(guild.channels()[0].guild_state().unwrap().name, "chat");
        assert_eq!(guild.channels()[0].guild_id(), Some("g1"));
        assert!(guild.remove_channel("c2").is_some());
        assert!(guild.remove_channel("c2").is_none());
    }
}
