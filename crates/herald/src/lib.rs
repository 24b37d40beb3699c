//! # Herald
//!
//! A command registry and dispatch engine for chat bots.
//!
//! ## Overview
//!
//! Herald discovers pluggable commands, validates their metadata, indexes them
//! by name and alias, and routes prefixed chat messages to them, enforcing
//! per-command permissions and an owner-only restriction on the way.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌────────┐     ┌──────────┐
//! │ CommandSource │────▶│ Loader │────▶│ Registry │
//! └───────────────┘     └────────┘     └────┬─────┘
//!                                           │
//! ┌───────────────┐     ┌────────────┐      │      ┌──────────────┐
//! │    Adapter    │────▶│ Dispatcher │◀─────┘─────▶│  Authorizer  │
//! │ (mpsc sender) │     │ (one task  │             └──────────────┘
//! └───────────────┘     │ per message)────▶ Command::run
//!                       └────────────┘
//! ```
//!
//! - **Core**: the [`Command`](core::Command) trait, metadata and the chat
//!   collaborator traits adapters implement
//! - **Framework**: loading, lookup, authorization and dispatch
//! - **Runtime**: configuration, logging and the dispatch loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! define_command! {
//!     static PING = || Ok(Some(CommandExport::new(
//!         command_fn(|_bot, msg: BoxedMessage, _args| async move {
//!             msg.channel().send("Pong!").await?;
//!             Ok(())
//!         }),
//!         CommandInfo::new("ping", "!ping", "Checks that the bot is alive"),
//!     )));
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = HeraldRuntime::new();
//!     runtime.load(LinkedCommands, BotContext::empty()).await;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_adapter(tx);
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: `herald.toml` configuration files (default)
//! - `yaml-config`: `herald.yaml` configuration files
//! - `json-log`: JSON log output

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{HeraldConfig, HeraldRuntime};

    // Commands
    pub use herald_core::{
        BotContext, BoxError, BoxedCommand, Command, CommandDescriptor, CommandExport,
        CommandInfo, command_fn, define_command,
    };

    // Discovery
    pub use herald_core::{CommandSource, LinkedCommands, StaticCommands};

    // Chat collaborators, for adapters
    pub use herald_core::{
        BoxedMessage, Channel, ChatError, ChatResult, InboundMessage, Member, SentMessage,
    };

    // Dispatch
    pub use herald_framework::{DispatchConfig, DispatchOutcome, Dispatcher, LoadReport};
}
