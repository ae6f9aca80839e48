//! Messages.

use serde::Deserialize;

use super::user::User;

/// A message posted in a text-capable channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Guild the message was posted in, absent for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Message author.
    pub author: User,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// ISO-8601 creation timestamp.
    #[serde(default)]
    pub timestamp: String,
    /// ISO-8601 timestamp of the last edit.
    #[serde(default)]
    pub edited_timestamp: Option<String>,
    /// Whether this is a text-to-speech message.
    #[serde(default)]
    pub tts: bool,
    /// Whether the message mentions everyone.
    #[serde(default)]
    pub mention_everyone: bool,
    /// Users mentioned in the message.
    #[serde(default)]
    pub mentions: Vec<User>,
    /// Ids of roles mentioned in the message.
    #[serde(default)]
    pub mention_roles: Vec<String>,
    /// Whether the message is pinned.
    #[serde(default)]
    pub pinned: bool,
    /// Numeric message type.
    #[serde(rename = "type", default)]
    pub kind: u64,
}

impl Message {
    /// Returns `true` if the message was sent in a direct-message channel.
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }

    /// Returns `true` if `user_id` is mentioned explicitly.
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|user| user.id == user_id)
    }
}
