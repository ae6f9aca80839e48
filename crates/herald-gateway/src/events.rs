//! Typed event records and the [`Events`] bundle of emitters.
//!
//! Each record struct is what listeners receive for one event key. Records
//! are built by the dispatchers and handed out by reference; they are never
//! mutated after publication.
//!
//! ```rust,ignore
//! let events = Events::new();
//! events.guild_create.on(|event: &GuildCreate| {
//!     println!("joined {}", event.guild.name);
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use herald_core::Emitter;

use crate::model::{Channel, Guild, GuildEmoji, GuildMember, Message, ReactionEmoji, Role, User};

// ============================================================================
// Records
// ============================================================================

/// The session is established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ready;

macro_rules! channel_records {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name {
                pub channel: Channel,
            }
        )*
    };
}

channel_records! {
    /// A channel was created.
    ChannelCreate,
    /// A channel was updated.
    ChannelUpdate,
    /// A channel was deleted.
    ChannelDelete,
    /// A message was pinned or unpinned.
    ChannelPinsUpdate,
}

/// A guild became available, either on join or after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildCreate {
    pub guild: Arc<Guild>,
}

/// A guild's metadata changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildUpdate {
    pub guild: Arc<Guild>,
}

/// A guild was left or became unavailable. Carries the guild as rebuilt
/// from the event body, which may hold only its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildDelete {
    pub guild: Arc<Guild>,
}

/// A user was banned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildBanAdd {
    pub guild: Arc<Guild>,
    pub user: User,
}

/// A ban was lifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildBanRemove {
    pub guild: Arc<Guild>,
    pub user: User,
}

/// The guild's emoji list was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildEmojisUpdate {
    pub guild: Arc<Guild>,
    pub emojis: Vec<GuildEmoji>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildIntegrationsUpdate {
    pub guild: Arc<Guild>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMemberAdd {
    pub guild: Arc<Guild>,
    pub member: GuildMember,
}

/// A member left or was removed. `member` is the cached member when one was
/// known, otherwise a member holding only the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMemberRemove {
    pub guild: Arc<Guild>,
    pub member: GuildMember,
}

/// A member changed. `old_member` is the cached state before the change,
/// absent when the member was never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMemberUpdate {
    pub guild: Arc<Guild>,
    pub member: GuildMember,
    pub old_member: Option<GuildMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRoleCreate {
    pub guild: Arc<Guild>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRoleUpdate {
    pub guild: Arc<Guild>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRoleDelete {
    pub guild: Arc<Guild>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCreate {
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageUpdate {
    pub message: Message,
}

/// A message was deleted. Only identifiers are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDelete {
    pub message_id: String,
    pub channel_id: String,
}

/// Several messages were deleted at once. Only identifiers are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDeleteBulk {
    pub message_ids: Vec<String>,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReactionAdd {
    pub channel: Channel,
    pub message_id: String,
    pub user_id: String,
    pub emoji: ReactionEmoji,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReactionRemove {
    pub channel: Channel,
    pub message_id: String,
    pub user_id: String,
    pub emoji: ReactionEmoji,
}

/// Every reaction was removed from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReactionRemoveAll {
    pub channel: Channel,
    pub message_id: String,
}

/// A user started typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingStart {
    pub channel: Channel,
    pub user_id: String,
    /// Unix time in seconds.
    pub timestamp: u64,
}

// ============================================================================
// Event Keys and the Emitter Bundle
// ============================================================================

/// A record type published through one [`Events`] field.
pub trait EventRecord: Sized + Send + Sync + 'static {
    /// The key identifying this event.
    const KEY: EventKey;

    /// Returns this record's emitter in `events`.
    fn emitter(events: &Events) -> &Emitter<Self>;

    /// Returns the wire tag this record originates from.
    fn tag(&self) -> &'static str {
        Self::KEY.tag()
    }
}

macro_rules! define_events {
    ($($field:ident: $record:ident => $name:literal, $tag:literal;)*) => {
        /// Identifies one event category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventKey {
            $($record,)*
        }

        impl EventKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [EventKey] = &[$(EventKey::$record,)*];

            /// Returns the camel-case event name, e.g. `guildCreate`.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(EventKey::$record => $name,)*
                }
            }

            /// Returns the wire tag that produces this event, e.g. `GUILD_CREATE`.
            pub const fn tag(self) -> &'static str {
                match self {
                    $(EventKey::$record => $tag,)*
                }
            }
        }

        /// One emitter per event key.
        ///
        /// Shared between the dispatcher, which publishes, and application
        /// code, which subscribes.
        pub struct Events {
            $(pub $field: Emitter<$record>,)*
        }

        impl Events {
            pub fn new() -> Self {
                Self {
                    $($field: Emitter::new(),)*
                }
            }

            /// Returns the number of listeners attached to `key`.
            pub fn listener_count(&self, key: EventKey) -> usize {
                match key {
                    $(EventKey::$record => self.$field.listener_count(),)*
                }
            }

            /// Detaches every listener from every emitter.
            pub fn clear(&self) {
                $(self.$field.clear();)*
            }
        }

        $(
            impl EventRecord for $record {
                const KEY: EventKey = EventKey::$record;

                fn emitter(events: &Events) -> &Emitter<Self> {
                    &events.$field
                }
            }
        )*
    };
}

define_events! {
    ready: Ready => "ready", "READY";
    channel_create: ChannelCreate => "channelCreate", "CHANNEL_CREATE";
    channel_update: ChannelUpdate => "channelUpdate", "CHANNEL_UPDATE";
    channel_delete: ChannelDelete => "channelDelete", "CHANNEL_DELETE";
    channel_pins_update: ChannelPinsUpdate => "channelPinsUpdate", "CHANNEL_PINS_UPDATE";
    guild_create: GuildCreate => "guildCreate", "GUILD_CREATE";
    guild_update: GuildUpdate => "guildUpdate", "GUILD_UPDATE";
    guild_delete: GuildDelete => "guildDelete", "GUILD_DELETE";
    guild_ban_add: GuildBanAdd => "guildBanAdd", "GUILD_BAN_ADD";
    guild_ban_remove: GuildBanRemove => "guildBanRemove", "GUILD_BAN_REMOVE";
    guild_emojis_update: GuildEmojisUpdate => "guildEmojisUpdate", "GUILD_EMOJIS_UPDATE";
    guild_integrations_update: GuildIntegrationsUpdate => "guildIntegrationsUpdate", "GUILD_INTEGRATIONS_UPDATE";
    guild_member_add: GuildMemberAdd => "guildMemberAdd", "GUILD_MEMBER_ADD";
    guild_member_remove: GuildMemberRemove => "guildMemberRemove", "GUILD_MEMBER_REMOVE";
    guild_member_update: GuildMemberUpdate => "guildMemberUpdate", "GUILD_MEMBER_UPDATE";
    guild_role_create: GuildRoleCreate => "guildRoleCreate", "GUILD_ROLE_CREATE";
    guild_role_update: GuildRoleUpdate => "guildRoleUpdate", "GUILD_ROLE_UPDATE";
    guild_role_delete: GuildRoleDelete => "guildRoleDelete", "GUILD_ROLE_DELETE";
    message_create: MessageCreate => "messageCreate", "MESSAGE_CREATE";
    message_update: MessageUpdate => "messageUpdate", "MESSAGE_UPDATE";
    message_delete: MessageDelete => "messageDelete", "MESSAGE_DELETE";
    message_delete_bulk: MessageDeleteBulk => "messageDeleteBulk", "MESSAGE_DELETE_BULK";
    message_reaction_add: MessageReactionAdd => "messageReactionAdd", "MESSAGE_REACTION_ADD";
    message_reaction_remove: MessageReactionRemove => "messageReactionRemove", "MESSAGE_REACTION_REMOVE";
    message_reaction_remove_all: MessageReactionRemoveAll => "messageReactionRemoveAll", "MESSAGE_REACTION_REMOVE_ALL";
    typing_start: TypingStart => "typingStart", "TYPING_START";
}

impl Events {
    /// Returns the emitter for record type `R`.
    pub fn get<R: EventRecord>(&self) -> &Emitter<R> {
        R::emitter(self)
    }

    /// Publishes `record` on its emitter and returns the number of listeners
    /// that completed.
    pub fn emit<R: EventRecord>(&self, record: &R) -> usize {
        R::emitter(self).emit(record)
    }

    /// Returns `true` if anything listens on `key`.
    pub fn has_listeners(&self, key: EventKey) -> bool {
        self.listener_count(key) > 0
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in EventKey::ALL {
            let count = self.listener_count(*key);
            if count > 0 {
                map.entry(&key.as_str(), &count);
            }
        }
        map.finish()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
