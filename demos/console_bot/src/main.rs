//! Console Bot Example
//!
//! Every line typed on stdin is a chat message from the console user, and
//! bot replies are printed to stdout.  Commands are registered with
//! `define_command!` in [`commands`] and discovered at link time.
//!
//! The console user is the bot owner, so `!shutdown` works, but holds no
//! permissions, so `!ban` is denied.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot
//! > !ping
//! < Pong! 🏓
//! > !say hello there
//! < hello there
//! > !ban someone
//! < :no_entry_sign: You need the permission `BAN_MEMBERS` to use this command.
//! ```
//!
//! Use `HERALD_BOT__PREFIX` or a `herald.toml` to change the prefix.

mod commands;
mod console;

use std::sync::Arc;

use anyhow::Result;
use herald::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

use crate::commands::ConsoleBot;
use crate::console::{ConsoleMember, pump_stdin};

#[tokio::main]
async fn main() -> Result<()> {
    let mut runtime = HeraldRuntime::new();

    let bot = Arc::new(ConsoleBot::default());
    let report = runtime
        .load(LinkedCommands, BotContext::from_arc(Arc::clone(&bot)))
        .await;
    info!(
        registered = ?report.registered,
        skipped = ?report.skipped,
        "Console bot ready"
    );
    let _ = bot.commands.set(runtime.commands());

    let owner = runtime.dispatch_config().effective_owner_id().to_string();
    let member = Arc::new(ConsoleMember::new(owner, Vec::new()));

    let (sender, receiver) = mpsc::channel(32);
    std::thread::spawn(move || pump_stdin(member, sender));

    let stats = runtime
        .run_until(receiver, bot.shutdown.notified())
        .await?;
    info!(?stats, "Bye");
    Ok(())
}
