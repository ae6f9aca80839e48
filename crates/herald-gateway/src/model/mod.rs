//! Domain entities rebuilt from gateway payload bodies.
//!
//! Every entity derives `Deserialize` against its wire shape, so a body is
//! validated once at the dispatch boundary. Two entities go through an
//! intermediate wire struct:
//!
//! - [`Channel`] is built from [`ChannelData`], whose numeric `type` picks
//!   the variant.
//! - [`Guild`] is built from [`GuildData`], which indexes roles and members by
//!   id and stamps the guild id onto nested channels and members.
//!
//! ```text
//! Guild { id, name, … }
//! ├── channels: Vec<Channel>
//! │   └── Channel ─ GuildText | DirectMessage | GuildVoice | GuildCategory
//! │                 | GuildNews | GuildStore | Other
//! ├── roles:   HashMap<role id, Role>
//! ├── members: HashMap<user id, GuildMember>
//! └── emojis:  Vec<GuildEmoji>
//! ```

pub mod channel;
pub mod emoji;
pub mod guild;
pub mod member;
pub mod message;
pub mod overwrite;
pub mod role;
pub mod user;

pub use channel::{
    Channel, ChannelBase, ChannelData, ChannelType, DmChannel, GuildCategoryChannel,
    GuildChannelState, GuildNewsChannel, GuildStoreChannel, GuildTextChannel, GuildVoiceChannel,
    TextChannel, TextState,
};
pub use emoji::{GuildEmoji, ReactionEmoji};
pub use guild::{Guild, GuildData};
pub use member::GuildMember;
pub use message::Message;
pub use overwrite::{OverwriteKind, PermissionOverwrite};
pub use role::Role;
pub use user::User;

/// Accepts a `u64` sent either as a JSON number or as a decimal string.
///
/// Permission bitsets moved from numbers to strings between API versions.
pub(crate) mod flexible_u64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Str(String),
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Ok(value),
            Raw::Str(value) => value.parse().map_err(D::Error::custom),
        }
    }
}
