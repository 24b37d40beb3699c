//! Command trait, metadata and descriptors.
//!
//! # Shapes
//!
//! A command goes through two shapes on its way into the registry:
//!
//! - [`CommandExport`]: the *raw* value a candidate produces.  Both halves are
//!   optional and the metadata is untyped JSON; a plugin that forgets a field
//!   is reported at load time.
//! - [`CommandDescriptor`]: the *validated* record with typed [`CommandInfo`],
//!   a handler and the identifier of the candidate it came from.
//!
//! The framework's loader turns the former into the latter.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_core::{BotContext, BoxedMessage, BoxError, Command, CommandExport, CommandInfo};
//!
//! struct Ping;
//!
//! #[async_trait::async_trait]
//! impl Command for Ping {
//!     async fn run(&self, _bot: BotContext, msg: BoxedMessage, _args: Vec<String>) -> Result<(), BoxError> {
//!         msg.channel().send("Pong!").await?;
//!         Ok(())
//!     }
//! }
//!
//! fn load() -> Result<Option<CommandExport>, BoxError> {
//!     Ok(Some(CommandExport::new(Ping, CommandInfo::new("ping", "!ping", "Replies with Pong!"))))
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::bot::BotContext;
use crate::error::BoxError;
use crate::message::BoxedMessage;

// ─── Command ──────────────────────────────────────────────────────────────────

/// Executable behaviour of a command.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// Executes the command.
    ///
    /// `args` holds the whitespace-separated tokens after the command name.
    /// Any reply is the handler's own business; an `Err` is reported to the
    /// caller by the dispatcher.
    async fn run(
        &self,
        bot: BotContext,
        message: BoxedMessage,
        args: Vec<String>,
    ) -> Result<(), BoxError>;

    /// One-shot setup, called once after every command has been registered.
    async fn init(&self, _bot: &BotContext) {}
}

/// A shared command handler.
pub type BoxedCommand = Arc<dyn Command>;

/// A [`Command`] backed by an async closure.  Created by [`command_fn`].
pub struct FnCommand<F> {
    f: F,
}

/// Wraps an async closure as a [`Command`].
///
/// ```rust,ignore
/// let echo = command_fn(|_bot, msg: BoxedMessage, args: Vec<String>| async move {
///     msg.channel().send(&args.join(" ")).await?;
///     Ok(())
/// });
/// ```
pub fn command_fn<F, Fut>(f: F) -> FnCommand<F>
where
    F: Fn(BotContext, BoxedMessage, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    FnCommand { f }
}

#[async_trait]
impl<F, Fut> Command for FnCommand<F>
where
    F: Fn(BotContext, BoxedMessage, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn run(
        &self,
        bot: BotContext,
        message: BoxedMessage,
        args: Vec<String>,
    ) -> Result<(), BoxError> {
        (self.f)(bot, message, args).await
    }
}

// ─── CommandInfo ──────────────────────────────────────────────────────────────

/// Typed command metadata.
///
/// Deserialises from the JSON `info` object of a [`CommandExport`].  Besides
/// the snake-case field names it accepts `ownerOnly` and the short `perms`
/// key, and a single permission string in place of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Primary name, matched case-insensitively.
    pub name: String,

    /// Alternative names, matched case-insensitively.
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,

    /// Usage line shown in help output.
    pub usage: String,

    /// One-line description shown in help output.
    pub description: String,

    /// Capability tokens the caller must hold, checked in order.
    #[serde(default, alias = "perms", deserialize_with = "one_or_many")]
    pub permissions: Vec<String>,

    /// Restricts the command to the bot owner.
    #[serde(default, alias = "ownerOnly", deserialize_with = "null_as_default")]
    pub owner_only: bool,
}

impl CommandInfo {
    /// Creates metadata with no aliases and no restrictions.
    pub fn new(
        name: impl Into<String>,
        usage: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            usage: usage.into(),
            description: description.into(),
            permissions: Vec::new(),
            owner_only: false,
        }
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds a required permission.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Restricts the command to the bot owner.
    pub fn owner_only(mut self, owner_only: bool) -> Self {
        self.owner_only = owner_only;
        self
    }

    /// Renders the metadata as the JSON object a [`CommandExport`] carries.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "aliases": self.aliases,
            "usage": self.usage,
            "description": self.description,
            "permissions": self.permissions,
            "owner_only": self.owner_only,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(token)) => vec![token],
        Some(OneOrMany::Many(tokens)) => tokens,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── CommandExport ────────────────────────────────────────────────────────────

/// The raw value produced by a command candidate, before validation.
#[derive(Default, Clone)]
pub struct CommandExport {
    /// The `run` half.  `None` is rejected as a missing run function.
    pub handler: Option<BoxedCommand>,
    /// The untyped `info` object.
    pub info: Option<Value>,
}

impl CommandExport {
    /// Builds a well-formed export from a handler and typed metadata.
    pub fn new(handler: impl Command, info: CommandInfo) -> Self {
        Self::shared(Arc::new(handler), &info)
    }

    /// Same as [`new`](Self::new) for an already shared handler.
    pub fn shared(handler: BoxedCommand, info: &CommandInfo) -> Self {
        Self {
            handler: Some(handler),
            info: Some(info.to_json()),
        }
    }

    /// Builds an export from arbitrary, possibly malformed parts.
    pub fn from_parts(handler: Option<BoxedCommand>, info: Option<Value>) -> Self {
        Self { handler, info }
    }
}

impl fmt::Debug for CommandExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExport")
            .field("has_handler", &self.handler.is_some())
            .field("info", &self.info)
            .finish()
    }
}

// ─── CommandDescriptor ────────────────────────────────────────────────────────

/// A validated command, as held by the registry.
pub struct CommandDescriptor {
    info: CommandInfo,
    handler: BoxedCommand,
    source: String,
}

impl CommandDescriptor {
    /// Assembles a descriptor.  Validation is the loader's job.
    pub fn new(info: CommandInfo, handler: BoxedCommand, source: impl Into<String>) -> Self {
        Self {
            info,
            handler,
            source: source.into(),
        }
    }

    /// The full metadata.
    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    /// Primary name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.info.aliases
    }

    /// Usage line.
    pub fn usage(&self) -> &str {
        &self.info.usage
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.info.description
    }

    /// Required permissions, in check order.
    pub fn permissions(&self) -> &[String] {
        &self.info.permissions
    }

    /// Whether only the owner may run the command.
    pub fn is_owner_only(&self) -> bool {
        self.info.owner_only
    }

    /// Identifier of the candidate this command was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The handler.
    pub fn handler(&self) -> &BoxedCommand {
        &self.handler
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("info", &self.info)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
