//! Replay Bot Example
//!
//! Feeds a recorded gateway session (one JSON frame per line) through a
//! [`Client`] and logs the typed events that come out.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package replay-bot -- demos/replay_bot/session.jsonl
//! cargo run --package replay-bot -- session.jsonl --intents GUILDS,GUILD_MEMBERS
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use herald::prelude::*;
use herald::runtime::LoggingBuilder;

#[derive(Debug, Parser)]
#[command(about = "Replay a recorded gateway session through Herald")]
struct Args {
    /// File with one raw gateway frame per line.
    frames: PathBuf,

    /// Comma-separated intents to declare, e.g. GUILDS,GUILD_MESSAGES.
    #[arg(long, value_delimiter = ',')]
    intents: Vec<Intent>,

    /// Log filter directive, e.g. `herald_gateway=trace`.
    #[arg(long, default_value = "info")]
    log: String,
}

fn register_listeners(events: &Events) {
    events.ready.on(|_: &Ready| info!("Session ready"));

    events.guild_create.on(|event: &GuildCreate| {
        info!(
            guild = %event.guild.name,
            channels = event.guild.channels().len(),
            members = event.guild.members().len(),
            "Guild available"
        );
    });

    events.guild_member_update.on(|event: &GuildMemberUpdate| {
        let before = event
            .old_member
            .as_ref()
            .map(|member| member.display_name().to_string());
        info!(
            guild = %event.guild.name,
            before = ?before,
            after = %event.member.display_name(),
            "Member updated"
        );
    });

    events.channel_create.on(|event: &ChannelCreate| {
        info!(channel = %event.channel.id(), kind = ?event.channel.channel_type(), "Channel created");
    });

    events.message_create.on(|event: &MessageCreate| {
        info!(
            channel = %event.message.channel_id,
            author = %event.message.author.tag(),
            content = %event.message.content,
            "Message"
        );
    });

    events.message_reaction_add.on(|event: &MessageReactionAdd| {
        info!(
            message = %event.message_id,
            user = %event.user_id,
            emoji = ?event.emoji,
            "Reaction added"
        );
    });

    events.typing_start.on(|event: &TypingStart| {
        info!(channel = %event.channel.id(), user = %event.user_id, "Typing");
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingBuilder::new().directive(&args.log).init();

    let raw = tokio::fs::read_to_string(&args.frames)
        .await
        .with_context(|| format!("reading {}", args.frames.display()))?;
    let requester = ReplayRequester::from_frames(raw.lines().filter(|line| !line.trim().is_empty()))
        .context("parsing frames")?;

    let mut options = ClientOptions::new();
    if !args.intents.is_empty() {
        options = options.with_intents(args.intents.iter().copied().collect::<Intents>());
    }

    let client = Client::new("replay", options, Arc::new(requester));
    register_listeners(client.events());

    client.run().await?;
    Ok(())
}
