//! Guild emojis and reaction emojis.

use serde::Deserialize;

use super::user::User;

/// A custom emoji owned by a guild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuildEmoji {
    /// Emoji id.
    pub id: Option<String>,
    /// Emoji name.
    #[serde(default)]
    pub name: Option<String>,
    /// Roles allowed to use this emoji.
    #[serde(default)]
    pub roles: Vec<String>,
    /// The user that uploaded the emoji.
    #[serde(default)]
    pub user: Option<User>,
    /// Whether the emoji must be wrapped in colons.
    #[serde(default)]
    pub require_colons: bool,
    /// Whether an integration manages this emoji.
    #[serde(default)]
    pub managed: bool,
    /// Whether the emoji is animated.
    #[serde(default)]
    pub animated: bool,
    /// Whether the emoji can currently be used.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl GuildEmoji {
    /// Returns the markup used to render this emoji in a message.
    pub fn mention(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        let id = self.id.as_deref().unwrap_or_default();
        if self.animated {
            format!("<a:{name}:{id}>")
        } else {
            format!("<:{name}:{id}>")
        }
    }
}

#[derive(Deserialize)]
struct ReactionEmojiData {
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    animated: bool,
}

/// The emoji attached to a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ReactionEmojiData")]
pub enum ReactionEmoji {
    /// A unicode emoji.
    Standard {
        /// The emoji itself.
        name: String,
    },
    /// A guild emoji.
    Custom {
        /// Emoji id.
        id: String,
        /// Emoji name, absent when the emoji was deleted.
        name: Option<String>,
        /// Whether the emoji is animated.
        animated: bool,
    },
}

impl From<ReactionEmojiData> for ReactionEmoji {
    fn from(data: ReactionEmojiData) -> Self {
        match data.id {
            Some(id) => Self::Custom {
                id,
                name: data.name,
                animated: data.animated,
            },
            None => Self::Standard {
                name: data.name.unwrap_or_default(),
            },
        }
    }
}
