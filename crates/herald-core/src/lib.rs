//! # Herald Core
//!
//! Core types of the Herald command framework.
//!
//! This crate holds everything a command author or a chat adapter needs, and
//! nothing that makes decisions:
//!
//! - **Commands**: the [`Command`] trait, typed [`CommandInfo`] metadata, the raw
//!   [`CommandExport`] and the validated [`CommandDescriptor`].
//! - **Discovery**: [`CommandSource`]s that enumerate [`Candidate`]s, including
//!   link-time discovery through [`define_command!`].
//! - **Chat collaborators**: [`InboundMessage`], [`Member`], [`Channel`] and
//!   [`SentMessage`], implemented by platform adapters.
//! - **Bot context**: the opaque [`BotContext`] handed to command hooks.
//!
//! Loading, lookup, authorization and dispatch live in `herald-framework`.

pub mod bot;
pub mod command;
pub mod discovery;
pub mod error;
pub mod message;

pub use bot::BotContext;
pub use command::{
    BoxedCommand, Command, CommandDescriptor, CommandExport, CommandInfo, FnCommand, command_fn,
};
pub use discovery::{
    Candidate, CommandSource, LINKED_COMMANDS, LinkedCommand, LinkedCommands, LoadFn, LoadResult,
    StaticCommands,
};
pub use error::{BoxError, ChatError, ChatResult, panic_message};
pub use message::{BoxedMessage, Channel, InboundMessage, Member, SentMessage};

#[doc(hidden)]
pub use linkme as __linkme;
