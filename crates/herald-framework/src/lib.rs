//! # Herald Framework
//!
//! Command loading, lookup, authorization and dispatch.
//!
//! # Architecture
//!
//! ```text
//! CommandSource ──► Loader ──► Registry (read-only, Arc)
//!                                 │
//! BoxedMessage ──► Dispatcher ────┤
//!                      │          ▼
//!                      ├──► Authorizer ──► Denial notice
//!                      └──► Command::run ──► failure notice
//! ```
//!
//! - [`Loader`] validates [`Candidate`](herald_core::Candidate)s, rejects
//!   duplicates and collects a [`LoadReport`].
//! - [`Registry`] resolves names and aliases case-insensitively.
//! - [`Authorizer`] checks permissions, then ownership.
//! - [`Dispatcher`] parses prefixed messages and runs the matched command.
//!   It is also a `tower::Service`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald_core::{BotContext, LinkedCommands};
//! use herald_framework::{DispatchConfig, Dispatcher, Loader, initialize};
//!
//! let (registry, report) = Loader::new().load(LinkedCommands).finish();
//! let bot = BotContext::new(my_bot);
//! initialize(&registry, &bot).await;
//!
//! let dispatcher = Dispatcher::new(Arc::new(registry), bot, &DispatchConfig::default());
//! dispatcher.dispatch(message).await;
//! ```

pub mod authorizer;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod registry;

#[cfg(test)]
mod testing;

pub use authorizer::{Authorizer, authorize};
pub use config::{DEFAULT_NOTICE_TTL, DEFAULT_OWNER_ID, DEFAULT_PREFIX, DispatchConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher, Invocation, parse_invocation};
pub use error::{Denial, InvalidCommand, LoadError};
pub use loader::{LoadReport, Loader, initialize, validate};
pub use registry::Registry;
