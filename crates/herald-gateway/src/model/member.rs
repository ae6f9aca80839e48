//! Guild members.

use serde::Deserialize;

use super::user::User;

/// A user's membership in a guild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuildMember {
    /// The member's user account.
    pub user: User,
    /// The owning guild. Filled in by the cache when the body omits it.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Guild nickname.
    #[serde(default)]
    pub nick: Option<String>,
    /// Ids of the roles assigned to the member.
    #[serde(default)]
    pub roles: Vec<String>,
    /// ISO-8601 join timestamp.
    #[serde(default)]
    pub joined_at: Option<String>,
    /// Whether the member is deafened in voice channels.
    #[serde(default)]
    pub deaf: bool,
    /// Whether the member is muted in voice channels.
    #[serde(default)]
    pub mute: bool,
}

impl GuildMember {
    /// Creates a member that only knows its user, for removals of members the
    /// cache never saw.
    pub fn from_user(user: User, guild_id: impl Into<String>) -> Self {
        Self {
            user,
            guild_id: Some(guild_id.into()),
            nick: None,
            roles: Vec::new(),
            joined_at: None,
            deaf: false,
            mute: false,
        }
    }

    /// Returns the member's user id.
    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Returns the nickname if set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.username)
    }

    /// Returns `true` if the member has the role `role_id`.
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|id| id == role_id)
    }
}
