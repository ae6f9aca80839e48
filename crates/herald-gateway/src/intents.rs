//! Subscription scopes ("intents").
//!
//! The remote side only transmits the event categories the session declared
//! interest in. Each [`Intent`] is one bit of that declaration and unlocks a
//! fixed list of [`EventKey`]s:
//!
//! ```text
//! bit  intent                    unlocks
//! ───  ────────────────────────  ──────────────────────────────────────────
//!  0   GUILDS                    guild create/update/delete, roles, channels
//!  1   GUILD_MEMBERS             member add/update/remove
//!  2   GUILD_BANS                ban add/remove
//!  3   GUILD_EMOJIS              emojis update
//!  4   GUILD_INTEGRATIONS        integrations update
//!  5   GUILD_WEBHOOKS            -
//!  6   GUILD_INVITES             -
//!  7   GUILD_VOICE_STATES        -
//!  8   GUILD_PRESENCES           -
//!  9   GUILD_MESSAGES            message create/update/delete/delete bulk
//! 10   GUILD_MESSAGE_REACTIONS   reaction add/remove/remove all
//! 11   GUILD_MESSAGE_TYPING      typing start
//! 12   DIRECT_MESSAGES           channel create, messages, pins update
//! 13   DIRECT_MESSAGE_REACTIONS  reaction add/remove/remove all
//! 14   DIRECT_MESSAGE_TYPING     typing start
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use herald_core::Emitter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{EventKey, EventRecord, Events};

// ============================================================================
// Intent
// ============================================================================

/// One subscription scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Guilds,
    GuildMembers,
    GuildBans,
    GuildEmojis,
    GuildIntegrations,
    GuildWebhooks,
    GuildInvites,
    GuildVoiceStates,
    GuildPresences,
    GuildMessages,
    GuildMessageReactions,
    GuildMessageTyping,
    DirectMessages,
    DirectMessageReactions,
    DirectMessageTyping,
}

const REACTIONS: &[EventKey] = &[
    EventKey::MessageReactionAdd,
    EventKey::MessageReactionRemove,
    EventKey::MessageReactionRemoveAll,
];

impl Intent {
    /// Every scope, in bit order.
    pub const ALL: [Intent; 15] = [
        Intent::Guilds,
        Intent::GuildMembers,
        Intent::GuildBans,
        Intent::GuildEmojis,
        Intent::GuildIntegrations,
        Intent::GuildWebhooks,
        Intent::GuildInvites,
        Intent::GuildVoiceStates,
        Intent::GuildPresences,
        Intent::GuildMessages,
        Intent::GuildMessageReactions,
        Intent::GuildMessageTyping,
        Intent::DirectMessages,
        Intent::DirectMessageReactions,
        Intent::DirectMessageTyping,
    ];

    /// Returns this scope's bit in the declaration mask.
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    /// Returns the wire name, e.g. `GUILD_MEMBERS`.
    pub const fn name(self) -> &'static str {
        match self {
            Intent::Guilds => "GUILDS",
            Intent::GuildMembers => "GUILD_MEMBERS",
            Intent::GuildBans => "GUILD_BANS",
            Intent::GuildEmojis => "GUILD_EMOJIS",
            Intent::GuildIntegrations => "GUILD_INTEGRATIONS",
            Intent::GuildWebhooks => "GUILD_WEBHOOKS",
            Intent::GuildInvites => "GUILD_INVITES",
            Intent::GuildVoiceStates => "GUILD_VOICE_STATES",
            Intent::GuildPresences => "GUILD_PRESENCES",
            Intent::GuildMessages => "GUILD_MESSAGES",
            Intent::GuildMessageReactions => "GUILD_MESSAGE_REACTIONS",
            Intent::GuildMessageTyping => "GUILD_MESSAGE_TYPING",
            Intent::DirectMessages => "DIRECT_MESSAGES",
            Intent::DirectMessageReactions => "DIRECT_MESSAGE_REACTIONS",
            Intent::DirectMessageTyping => "DIRECT_MESSAGE_TYPING",
        }
    }

    /// Returns the event keys this scope unlocks, in table order.
    pub const fn event_keys(self) -> &'static [EventKey] {
        match self {
            Intent::Guilds => &[
                EventKey::GuildCreate,
                EventKey::GuildUpdate,
                EventKey::GuildDelete,
                EventKey::GuildRoleCreate,
                EventKey::GuildRoleUpdate,
                EventKey::GuildRoleDelete,
                EventKey::ChannelCreate,
                EventKey::ChannelUpdate,
                EventKey::ChannelDelete,
                EventKey::ChannelPinsUpdate,
            ],
            Intent::GuildMembers => &[
                EventKey::GuildMemberAdd,
                EventKey::GuildMemberUpdate,
                EventKey::GuildMemberRemove,
            ],
            Intent::GuildBans => &[EventKey::GuildBanAdd, EventKey::GuildBanRemove],
            Intent::GuildEmojis => &[EventKey::GuildEmojisUpdate],
            Intent::GuildIntegrations => &[EventKey::GuildIntegrationsUpdate],
            Intent::GuildWebhooks
            | Intent::GuildInvites
            | Intent::GuildVoiceStates
            | Intent::GuildPresences => &[],
            Intent::GuildMessages => &[
                EventKey::MessageCreate,
                EventKey::MessageUpdate,
                EventKey::MessageDelete,
                EventKey::MessageDeleteBulk,
            ],
            Intent::GuildMessageReactions | Intent::DirectMessageReactions => REACTIONS,
            Intent::GuildMessageTyping | Intent::DirectMessageTyping => &[EventKey::TypingStart],
            Intent::DirectMessages => &[
                EventKey::ChannelCreate,
                EventKey::MessageCreate,
                EventKey::MessageUpdate,
                EventKey::MessageDelete,
                EventKey::ChannelPinsUpdate,
            ],
        }
    }

    /// Returns `true` if this scope unlocks `key`.
    pub fn unlocks(self, key: EventKey) -> bool {
        self.event_keys().contains(&key)
    }

    /// Returns every scope that unlocks `key`.
    pub fn unlocking(key: EventKey) -> impl Iterator<Item = Intent> {
        Self::ALL.into_iter().filter(move |intent| intent.unlocks(key))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown scope name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown intent `{0}`")]
pub struct UnknownIntent(pub String);

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}

// ============================================================================
// Intents bitset
// ============================================================================

/// A set of scopes, as declared to the remote side.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Intents(u32);

impl Intents {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every known scope.
    pub const fn all() -> Self {
        Self((1 << Intent::ALL.len() as u32) - 1)
    }

    /// Builds a set from a raw mask, discarding unknown bits.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::all().0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, intent: Intent) -> bool {
        self.0 & intent.bit() != 0
    }

    pub fn insert(&mut self, intent: Intent) {
        self.0 |= intent.bit();
    }

    pub fn remove(&mut self, intent: Intent) {
        self.0 &= !intent.bit();
    }

    /// Iterates the scopes in the set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Intent> {
        Intent::ALL.into_iter().filter(move |intent| self.contains(*intent))
    }
}

impl fmt::Debug for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Intent::name)).finish()
    }
}

impl From<Intent> for Intents {
    fn from(intent: Intent) -> Self {
        Self(intent.bit())
    }
}

impl FromIterator<Intent> for Intents {
    fn from_iter<I: IntoIterator<Item = Intent>>(iter: I) -> Self {
        let mut intents = Self::empty();
        intents.extend(iter);
        intents
    }
}

impl Extend<Intent> for Intents {
    fn extend<I: IntoIterator<Item = Intent>>(&mut self, iter: I) {
        for intent in iter {
            self.insert(intent);
        }
    }
}

impl BitOr for Intent {
    type Output = Intents;

    fn bitor(self, rhs: Intent) -> Intents {
        Intents(self.bit() | rhs.bit())
    }
}

impl BitOr<Intent> for Intents {
    type Output = Intents;

    fn bitor(self, rhs: Intent) -> Intents {
        Intents(self.0 | rhs.bit())
    }
}

impl BitOr for Intents {
    type Output = Intents;

    fn bitor(self, rhs: Intents) -> Intents {
        Intents(self.0 | rhs.0)
    }
}

impl BitOrAssign<Intent> for Intents {
    fn bitor_assign(&mut self, rhs: Intent) {
        self.insert(rhs);
    }
}

impl BitOrAssign for Intents {
    fn bitor_assign(&mut self, rhs: Intents) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// Scoped views
// ============================================================================

/// The emitters one scope unlocks.
#[derive(Debug, Clone, Copy)]
pub struct ScopedEvents<'a> {
    intent: Intent,
    events: &'a Events,
}

impl<'a> ScopedEvents<'a> {
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// The keys reachable through this view, in table order.
    pub fn keys(&self) -> &'static [EventKey] {
        self.intent.event_keys()
    }

    pub fn contains(&self, key: EventKey) -> bool {
        self.intent.unlocks(key)
    }

    /// Returns the emitter for `R` if this scope unlocks it.
    pub fn get<R: EventRecord>(&self) -> Option<&'a Emitter<R>> {
        if self.contains(R::KEY) {
            Some(R::emitter(self.events))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

/// Returns the emitters `intent` unlocks.
pub fn events_by_intent(events: &Events, intent: Intent) -> ScopedEvents<'_> {
    ScopedEvents { intent, events }
}

/// Returns one view per requested scope, in request order.
pub fn events_by_intents<'a>(events: &'a Events, intents: &[Intent]) -> Vec<ScopedEvents<'a>> {
    intents
        .iter()
        .map(|intent| events_by_intent(events, *intent))
        .collect()
}

impl Events {
    /// Returns the scopes needed to receive every event that currently has a
    /// listener. `READY` needs none.
    pub fn required_intents(&self) -> Intents {
        EventKey::ALL
            .iter()
            .filter(|key| self.has_listeners(**key))
            .flat_map(|key| Intent::unlocking(*key))
            .collect()
    }
}
