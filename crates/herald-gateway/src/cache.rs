//! Entity cache.
//!
//! The cache answers two questions during dispatch: "which guild is this?"
//! and "which guild owns this channel?". It is owned by a single dispatcher
//! and mutated only from there, so it needs no locking.
//!
//! ```text
//! guilds          guild id   ──► Arc<Guild>
//! channel_guilds  channel id ──► guild id      (always a key of `guilds`)
//! dm_channels     channel id ──► Channel::DirectMessage
//! ```
//!
//! Guilds are stored behind `Arc` so published events can hold a snapshot
//! without copying. Mutations go through `Arc::make_mut`, which copies only
//! while a listener still holds the previous snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::model::{Channel, DmChannel, Guild};

/// Guilds, channel associations and direct-message channels seen so far.
#[derive(Debug, Default)]
pub struct EntityCache {
    guilds: HashMap<String, Arc<Guild>>,
    channel_guilds: HashMap<String, String>,
    dm_channels: HashMap<String, Channel>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Guilds
    // ========================================================================

    pub fn guild(&self, guild_id: &str) -> Option<&Arc<Guild>> {
        self.guilds.get(guild_id)
    }

    pub fn contains_guild(&self, guild_id: &str) -> bool {
        self.guilds.contains_key(guild_id)
    }

    pub fn guilds(&self) -> impl Iterator<Item = &Arc<Guild>> {
        self.guilds.values()
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Stores `guild`, replacing any previous entry, and re-indexes its
    /// channels. Returns the stored snapshot.
    pub fn insert_guild(&mut self, guild: Guild) -> Arc<Guild> {
        if let Some(previous) = self.guilds.get(&guild.id) {
            for channel in previous.channels() {
                self.channel_guilds.remove(channel.id());
            }
        }
        for channel in guild.channels() {
            self.channel_guilds
                .insert(channel.id().to_string(), guild.id.clone());
        }

        trace!(guild_id = %guild.id, channels = guild.channels().len(), "Cached guild");
        let guild = Arc::new(guild);
        self.guilds.insert(guild.id.clone(), Arc::clone(&guild));
        guild
    }

    /// Removes a guild and every channel association pointing at it.
    pub fn remove_guild(&mut self, guild_id: &str) -> Option<Arc<Guild>> {
        let guild = self.guilds.remove(guild_id)?;
        self.channel_guilds.retain(|_, owner| owner.as_str() != guild_id);
        trace!(guild_id, "Evicted guild");
        Some(guild)
    }

    /// Applies `f` to a cached guild and returns the new snapshot alongside
    /// the closure's result. Returns `None` when the guild is not cached.
    ///
    /// Channel edits must use [`upsert_guild_channel`](Self::upsert_guild_channel)
    /// and [`remove_guild_channel`](Self::remove_guild_channel) instead.
    pub(crate) fn update_guild<R>(
        &mut self,
        guild_id: &str,
        f: impl FnOnce(&mut Guild) -> R,
    ) -> Option<(Arc<Guild>, R)> {
        let slot = self.guilds.get_mut(guild_id)?;
        let result = f(Arc::make_mut(slot));
        Some((Arc::clone(slot), result))
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Returns the id of the guild that owns `channel_id`.
    pub fn guild_id_for_channel(&self, channel_id: &str) -> Option<&str> {
        self.channel_guilds.get(channel_id).map(String::as_str)
    }

    /// Returns the guild that owns `channel_id`.
    pub fn guild_for_channel(&self, channel_id: &str) -> Option<&Arc<Guild>> {
        self.guild_id_for_channel(channel_id)
            .and_then(|guild_id| self.guilds.get(guild_id))
    }

    /// Looks a channel up among guild channels, then direct-message channels.
    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.guild_for_channel(channel_id)
            .and_then(|guild| guild.channel(channel_id))
            .or_else(|| self.dm_channels.get(channel_id))
    }

    /// Inserts or replaces a guild channel in its owning guild.
    ///
    /// Returns the updated guild, or `None` when the channel names no guild
    /// or the guild is not cached. A channel that moved between guilds is
    /// removed from the old one.
    pub fn upsert_guild_channel(&mut self, channel: Channel) -> Option<Arc<Guild>> {
        let guild_id = channel.guild_id()?.to_string();
        if !self.guilds.contains_key(&guild_id) {
            return None;
        }

        let channel_id = channel.id().to_string();
        match self.channel_guilds.get(&channel_id).cloned() {
            Some(previous_owner) if previous_owner != guild_id => {
                self.update_guild(&previous_owner, |g| g.remove_channel(&channel_id));
            }
            _ => {}
        }

        let (guild, _) = self.update_guild(&guild_id, |g| g.upsert_channel(channel))?;
        self.channel_guilds.insert(channel_id, guild_id);
        Some(guild)
    }

    /// Removes a guild channel and its association.
    pub fn remove_guild_channel(&mut self, channel_id: &str) -> Option<Channel> {
        let guild_id = self.channel_guilds.remove(channel_id)?;
        self.update_guild(&guild_id, |g| g.remove_channel(channel_id))
            .and_then(|(_, removed)| removed)
    }

    pub fn dm_channel(&self, channel_id: &str) -> Option<&DmChannel> {
        self.dm_channels.get(channel_id).and_then(Channel::as_dm)
    }

    /// Stores a direct-message channel. Other channel kinds are ignored and
    /// `false` is returned.
    pub fn insert_dm_channel(&mut self, channel: Channel) -> bool {
        if channel.as_dm().is_none() {
            return false;
        }
        self.dm_channels.insert(channel.id().to_string(), channel);
        true
    }

    pub fn remove_dm_channel(&mut self, channel_id: &str) -> Option<Channel> {
        self.dm_channels.remove(channel_id)
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.guilds.clear();
        self.channel_guilds.clear();
        self.dm_channels.clear();
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for (channel_id, guild_id) in &self.channel_guilds {
            let guild = self
                .guilds
                .get(guild_id)
                .unwrap_or_else(|| panic!("channel {channel_id} points at missing guild {guild_id}"));
            assert!(
                guild.channel(channel_id).is_some(),
                "channel {channel_id} missing from guild {guild_id}"
            );
        }
    }
}
