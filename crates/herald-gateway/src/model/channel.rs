//! Channels and their polymorphic construction.
//!
//! A channel body is first read into [`ChannelData`], which accepts every
//! field any channel type may carry. [`Channel::from_data`] then selects the
//! variant from the numeric `type`:
//!
//! | type | variant                    | text-capable |
//! |------|----------------------------|--------------|
//! | 0    | [`Channel::GuildText`]     | yes          |
//! | 1    | [`Channel::DirectMessage`] | yes          |
//! | 2    | [`Channel::GuildVoice`]    | no           |
//! | 4    | [`Channel::GuildCategory`] | no           |
//! | 5    | [`Channel::GuildNews`]     | yes          |
//! | 6    | [`Channel::GuildStore`]    | no           |
//! | *    | [`Channel::Other`]         | no           |

use std::collections::HashMap;

use serde::Deserialize;

use super::overwrite::PermissionOverwrite;
use super::user::User;

// ============================================================================
// Channel Type
// ============================================================================

/// Numeric channel type, with unknown values preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// `0`
    GuildText,
    /// `1`
    DirectMessage,
    /// `2`
    GuildVoice,
    /// `4`
    GuildCategory,
    /// `5`
    GuildNews,
    /// `6`
    GuildStore,
    /// Any other value.
    Unknown(u64),
}

impl From<u64> for ChannelType {
    fn from(value: u64) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::DirectMessage,
            2 => Self::GuildVoice,
            4 => Self::GuildCategory,
            5 => Self::GuildNews,
            6 => Self::GuildStore,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelType> for u64 {
    fn from(value: ChannelType) -> Self {
        match value {
            ChannelType::GuildText => 0,
            ChannelType::DirectMessage => 1,
            ChannelType::GuildVoice => 2,
            ChannelType::GuildCategory => 4,
            ChannelType::GuildNews => 5,
            ChannelType::GuildStore => 6,
            ChannelType::Unknown(other) => other,
        }
    }
}

// ============================================================================
// Wire Schema
// ============================================================================

/// Every field a channel body may carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u64,
    pub guild_id: Option<String>,
    pub position: Option<i32>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
    pub name: Option<String>,
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    pub last_message_id: Option<String>,
    pub last_pin_timestamp: Option<String>,
    pub bitrate: Option<u32>,
    pub user_limit: Option<u32>,
    pub rate_limit_per_user: Option<u32>,
    #[serde(default)]
    pub recipients: Vec<User>,
    pub parent_id: Option<String>,
}

// ============================================================================
// Shared Parts
// ============================================================================

/// Fields common to every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBase {
    /// Channel id.
    pub id: String,
    /// Raw numeric type.
    pub kind: u64,
    /// Permission overwrites keyed by target id. A repeated id keeps the
    /// last occurrence.
    pub permission_overwrites: HashMap<String, PermissionOverwrite>,
}

impl ChannelBase {
    fn from_data(data: &mut ChannelData) -> Self {
        let permission_overwrites = std::mem::take(&mut data.permission_overwrites)
            .into_iter()
            .map(|overwrite| (overwrite.id.clone(), overwrite))
            .collect();
        Self {
            id: std::mem::take(&mut data.id),
            kind: data.kind,
            permission_overwrites,
        }
    }

    /// Returns the channel type.
    pub fn channel_type(&self) -> ChannelType {
        self.kind.into()
    }
}

/// Fields common to channels that live inside a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildChannelState {
    /// Owning guild. Absent in channel lists nested in a guild body until
    /// the guild stamps it.
    pub guild_id: Option<String>,
    pub name: String,
    pub position: i32,
    /// Parent category.
    pub parent_id: Option<String>,
    pub nsfw: bool,
}

impl GuildChannelState {
    fn from_data(data: &mut ChannelData) -> Self {
        Self {
            guild_id: data.guild_id.take(),
            name: data.name.take().unwrap_or_default(),
            position: data.position.unwrap_or_default(),
            parent_id: data.parent_id.take(),
            nsfw: data.nsfw,
        }
    }
}

/// Fields common to text-capable channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextState {
    /// Id of the newest message.
    pub last_message_id: Option<String>,
    /// ISO-8601 timestamp of the newest pin.
    pub last_pin_timestamp: Option<String>,
}

impl TextState {
    fn from_data(data: &mut ChannelData) -> Self {
        Self {
            last_message_id: data.last_message_id.take(),
            last_pin_timestamp: data.last_pin_timestamp.take(),
        }
    }
}

/// Capability shared by channels that carry messages.
pub trait TextChannel {
    /// Returns the common channel fields.
    fn base(&self) -> &ChannelBase;

    /// Returns the message-related fields.
    fn text(&self) -> &TextState;

    /// Returns the message-related fields mutably.
    fn text_mut(&mut self) -> &mut TextState;

    fn last_message_id(&self) -> Option<&str> {
        self.text().last_message_id.as_deref()
    }

    fn last_pin_timestamp(&self) -> Option<&str> {
        self.text().last_pin_timestamp.as_deref()
    }

    /// Returns the mention markup for this channel.
    fn mention(&self) -> String {
        format!("<#{}>", self.base().id)
    }
}

macro_rules! impl_text_channel {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TextChannel for $ty {
                fn base(&self) -> &ChannelBase {
                    &self.base
                }

                fn text(&self) -> &TextState {
                    &self.text
                }

                fn text_mut(&mut self) -> &mut TextState {
                    &mut self.text
                }
            }
        )*
    };
}

// ============================================================================
// Variants
// ============================================================================

/// A guild text channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildTextChannel {
    pub base: ChannelBase,
    pub guild: GuildChannelState,
    pub text: TextState,
    pub topic: Option<String>,
    /// Slow-mode delay in seconds.
    pub rate_limit_per_user: u32,
}

/// A direct-message channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmChannel {
    pub base: ChannelBase,
    pub text: TextState,
    /// The other participants.
    pub recipients: Vec<User>,
}

/// A guild voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildVoiceChannel {
    pub base: ChannelBase,
    pub guild: GuildChannelState,
    pub bitrate: u32,
    /// Maximum number of connected users, `0` for unlimited.
    pub user_limit: u32,
}

/// A guild category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildCategoryChannel {
    pub base: ChannelBase,
    pub guild: GuildChannelState,
}

/// A guild announcement channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildNewsChannel {
    pub base: ChannelBase,
    pub guild: GuildChannelState,
    pub text: TextState,
    pub topic: Option<String>,
}

/// A guild store channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildStoreChannel {
    pub base: ChannelBase,
    pub guild: GuildChannelState,
}

impl_text_channel!(GuildTextChannel, DmChannel, GuildNewsChannel);

/// A channel of any type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ChannelData")]
pub enum Channel {
    GuildText(GuildTextChannel),
    DirectMessage(DmChannel),
    GuildVoice(GuildVoiceChannel),
    GuildCategory(GuildCategoryChannel),
    GuildNews(GuildNewsChannel),
    GuildStore(GuildStoreChannel),
    /// A type this library does not model; only the common fields survive.
    Other(ChannelBase),
}

impl From<ChannelData> for Channel {
    fn from(data: ChannelData) -> Self {
        Self::from_data(data)
    }
}

impl Channel {
    /// Builds the variant matching `data.kind`.
    pub fn from_data(mut data: ChannelData) -> Self {
        let base = ChannelBase::from_data(&mut data);
        match ChannelType::from(base.kind) {
            ChannelType::GuildText => Self::GuildText(GuildTextChannel {
                guild: GuildChannelState::from_data(&mut data),
                text: TextState::from_data(&mut data),
                topic: data.topic,
                rate_limit_per_user: data.rate_limit_per_user.unwrap_or_default(),
                base,
            }),
            ChannelType::DirectMessage => Self::DirectMessage(DmChannel {
                text: TextState::from_data(&mut data),
                recipients: data.recipients,
                base,
            }),
            ChannelType::GuildVoice => Self::GuildVoice(GuildVoiceChannel {
                guild: GuildChannelState::from_data(&mut data),
                bitrate: data.bitrate.unwrap_or_default(),
                user_limit: data.user_limit.unwrap_or_default(),
                base,
            }),
            ChannelType::GuildCategory => Self::GuildCategory(GuildCategoryChannel {
                guild: GuildChannelState::from_data(&mut data),
                base,
            }),
            ChannelType::GuildNews => Self::GuildNews(GuildNewsChannel {
                guild: GuildChannelState::from_data(&mut data),
                text: TextState::from_data(&mut data),
                topic: data.topic,
                base,
            }),
            ChannelType::GuildStore => Self::GuildStore(GuildStoreChannel {
                guild: GuildChannelState::from_data(&mut data),
                base,
            }),
            ChannelType::Unknown(_) => Self::Other(base),
        }
    }

    /// Returns the common channel fields.
    pub fn base(&self) -> &ChannelBase {
        match self {
            Self::GuildText(c) => &c.base,
            Self::DirectMessage(c) => &c.base,
            Self::GuildVoice(c) => &c.base,
            Self::GuildCategory(c) => &c.base,
            Self::GuildNews(c) => &c.base,
            Self::GuildStore(c) => &c.base,
            Self::Other(base) => base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn channel_type(&self) -> ChannelType {
        self.base().channel_type()
    }

    pub fn permission_overwrites(&self) -> &HashMap<String, PermissionOverwrite> {
        &self.base().permission_overwrites
    }

    /// Returns the guild-channel fields, if this is a guild channel.
    pub fn guild_state(&self) -> Option<&GuildChannelState> {
        match self {
            Self::GuildText(c) => Some(&c.guild),
            Self::GuildVoice(c) => Some(&c.guild),
            Self::GuildCategory(c) => Some(&c.guild),
            Self::GuildNews(c) => Some(&c.guild),
            Self::GuildStore(c) => Some(&c.guild),
            Self::DirectMessage(_) | Self::Other(_) => None,
        }
    }

    fn guild_state_mut(&mut self) -> Option<&mut GuildChannelState> {
        match self {
            Self::GuildText(c) => Some(&mut c.guild),
            Self::GuildVoice(c) => Some(&mut c.guild),
            Self::GuildCategory(c) => Some(&mut c.guild),
            Self::GuildNews(c) => Some(&mut c.guild),
            Self::GuildStore(c) => Some(&mut c.guild),
            Self::DirectMessage(_) | Self::Other(_) => None,
        }
    }

    /// Returns the owning guild id, if known.
    pub fn guild_id(&self) -> Option<&str> {
        self.guild_state()?.guild_id.as_deref()
    }

    pub(crate) fn set_guild_id(&mut self, guild_id: &str) {
        if let Some(state) = self.guild_state_mut() {
            state.guild_id = Some(guild_id.to_string());
        }
    }

    /// Returns the text capability, if this channel carries messages.
    pub fn as_text(&self) -> Option<&dyn TextChannel> {
        match self {
            Self::GuildText(c) => Some(c),
            Self::DirectMessage(c) => Some(c),
            Self::GuildNews(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut dyn TextChannel> {
        match self {
            Self::GuildText(c) => Some(c),
            Self::DirectMessage(c) => Some(c),
            Self::GuildNews(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.as_text().is_some()
    }

    pub fn as_dm(&self) -> Option<&DmChannel> {
        match self {
            Self::DirectMessage(c) => Some(c),
            _ => None,
        }
    }
}
