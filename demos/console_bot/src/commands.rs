//! The demo's commands, registered at link time.

use std::sync::{Arc, OnceLock};

use herald::core::LoadResult;
use herald::prelude::*;
use tokio::sync::Notify;

/// State shared with every command through the [`BotContext`].
#[derive(Default)]
pub struct ConsoleBot {
    /// Filled once loading is finished.
    pub commands: OnceLock<Vec<Arc<CommandDescriptor>>>,
    pub shutdown: Notify,
}

fn console_bot(bot: &BotContext) -> Result<Arc<ConsoleBot>, BoxError> {
    bot.downcast::<ConsoleBot>()
        .ok_or_else(|| "bot context is not a console bot".into())
}

fn load_ping() -> LoadResult {
    let ping = command_fn(|_bot, msg: BoxedMessage, _args| async move {
        msg.channel().send("Pong! 🏓").await?;
        Ok::<(), BoxError>(())
    });
    Ok(Some(CommandExport::new(
        ping,
        CommandInfo::new("ping", "!ping", "Checks that the bot is alive"),
    )))
}

fn load_echo() -> LoadResult {
    let echo = command_fn(|_bot, msg: BoxedMessage, args: Vec<String>| async move {
        if args.is_empty() {
            return Err(BoxError::from("Nothing to echo"));
        }
        msg.channel().send(&args.join(" ")).await?;
        Ok::<(), BoxError>(())
    });
    Ok(Some(CommandExport::new(
        echo,
        CommandInfo::new("echo", "!echo <text>", "Repeats the text back").alias("say"),
    )))
}

fn load_help() -> LoadResult {
    let help = command_fn(|bot: BotContext, msg: BoxedMessage, _args| async move {
        let bot = console_bot(&bot)?;
        let lines: Vec<String> = bot
            .commands
            .get()
            .map(|commands| {
                commands
                    .iter()
                    .map(|c| format!("{} - {}", c.usage(), c.description()))
                    .collect()
            })
            .unwrap_or_default();
        msg.channel().send(&lines.join("\n")).await?;
        Ok::<(), BoxError>(())
    });
    Ok(Some(CommandExport::new(
        help,
        CommandInfo::new("help", "!help", "Lists every command").alias("h"),
    )))
}

fn load_ban() -> LoadResult {
    let ban = command_fn(|_bot, msg: BoxedMessage, args: Vec<String>| async move {
        let user = args.first().ok_or("Tell me who to ban")?;
        msg.channel().send(&format!("{user} has been banned.")).await?;
        Ok::<(), BoxError>(())
    });
    Ok(Some(CommandExport::new(
        ban,
        CommandInfo::new("ban", "!ban <user>", "Bans a user").permission("BAN_MEMBERS"),
    )))
}

fn load_shutdown() -> LoadResult {
    let shutdown = command_fn(|bot: BotContext, msg: BoxedMessage, _args| async move {
        let bot = console_bot(&bot)?;
        msg.channel().send("Shutting down.").await?;
        bot.shutdown.notify_one();
        Ok::<(), BoxError>(())
    });
    Ok(Some(CommandExport::new(
        shutdown,
        CommandInfo::new("shutdown", "!shutdown", "Stops the bot").owner_only(true),
    )))
}

fn load_shared() -> LoadResult {
    Err("support module, not a command".into())
}

herald::core::define_command! {
    static PING = load_ping;
}

herald::core::define_command! {
    static ECHO = load_echo;
}

herald::core::define_command! {
    static HELP = load_help;
}

herald::core::define_command! {
    static BAN = load_ban;
}

herald::core::define_command! {
    static SHUTDOWN = load_shutdown;
}

herald::core::define_command! {
    /// Helpers shared by other commands; never loaded.
    static _SHARED = load_shared;
}
