//! Command loading.
//!
//! [`Loader`] turns the [`Candidate`]s of a [`CommandSource`] into a
//! [`Registry`]:
//!
//! ```text
//! candidate ──► private? ──yes──► skipped (debug log)
//!                  │no
//!                  ▼
//!               load() ──Err / panic──► LoadError::Failed
//!                  │
//!                  ▼
//!              validate ──first failed check──► LoadError::Invalid
//!                  │
//!                  ▼
//!              register ──name/alias taken──► LoadError::Duplicate
//!                  │
//!                  ▼
//!             registered
//! ```
//!
//! Every rejection is logged and collected in the [`LoadReport`]; none of them
//! stops the batch.  Once loading is finished, [`initialize`] runs each
//! command's `init` hook.
//!
//! # Example
//!
//! ```rust,ignore
//! let (registry, report) = Loader::new().load(&LinkedCommands).finish();
//! initialize(&registry, &bot).await;
//! ```

use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info};

use herald_core::{
    BotContext, BoxedCommand, Candidate, CommandDescriptor, CommandExport, CommandInfo,
    CommandSource, panic_message,
};

use crate::error::{InvalidCommand, LoadError};
use crate::registry::Registry;

/// Outcome of a load pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of the registered commands, in registration order.
    pub registered: Vec<String>,
    /// Identifiers of private candidates that were skipped.
    pub skipped: Vec<String>,
    /// Rejected candidates.
    pub errors: Vec<LoadError>,
}

impl LoadReport {
    /// Returns `true` if no candidate was rejected.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Builds a [`Registry`] from one or more command sources.
#[derive(Debug, Default)]
pub struct Loader {
    registry: Registry,
    report: LoadReport,
}

impl Loader {
    /// Creates a loader with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every candidate of `source`, in order.
    pub fn load(mut self, source: impl CommandSource) -> Self {
        for candidate in source.candidates() {
            self.load_candidate(&candidate);
        }
        self
    }

    /// Loads a single candidate.
    pub fn load_candidate(&mut self, candidate: &Candidate) {
        if candidate.is_private() {
            debug!(candidate = %candidate.id(), "Skipping private candidate");
            self.report.skipped.push(candidate.id().to_string());
            return;
        }

        match self.admit(candidate) {
            Ok(name) => {
                debug!(candidate = %candidate.id(), command = %name, "Command registered");
                self.report.registered.push(name);
            }
            Err(err) => {
                error!(candidate = %candidate.id(), "{err}");
                self.report.errors.push(err);
            }
        }
    }

    fn admit(&mut self, candidate: &Candidate) -> Result<String, LoadError> {
        let export = match panic::catch_unwind(AssertUnwindSafe(|| candidate.load())) {
            Ok(Ok(export)) => export,
            Ok(Err(err)) => {
                return Err(LoadError::Failed {
                    candidate: candidate.id().to_string(),
                    reason: err.to_string(),
                });
            }
            Err(payload) => {
                return Err(LoadError::Failed {
                    candidate: candidate.id().to_string(),
                    reason: panic_message(payload.as_ref())
                        .unwrap_or("loader panicked")
                        .to_string(),
                });
            }
        };

        let (info, handler) = validate(export).map_err(|reason| LoadError::Invalid {
            candidate: candidate.id().to_string(),
            reason,
        })?;

        let name = info.name.clone();
        self.registry
            .register(CommandDescriptor::new(info, handler, candidate.id()))?;
        Ok(name)
    }

    /// Read-only view of the registry built so far.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Finishes loading, logging a summary.
    pub fn finish(self) -> (Registry, LoadReport) {
        info!(
            registered = self.report.registered.len(),
            rejected = self.report.errors.len(),
            skipped = self.report.skipped.len(),
            "Commands loaded"
        );
        (self.registry, self.report)
    }
}

/// Validates a raw export into typed metadata and a handler.
///
/// Checks, in order: exports present, handler present, `info` is an object,
/// `name`/`usage`/`description` are strings, those strings are not blank, and
/// the optional fields have the right shape.
pub fn validate(export: Option<CommandExport>) -> Result<(CommandInfo, BoxedCommand), InvalidCommand> {
    const REQUIRED: [&str; 3] = ["name", "usage", "description"];

    let export = export.ok_or(InvalidCommand::EmptyExports)?;
    let handler = export.handler.ok_or(InvalidCommand::MissingRun)?;
    let Some(Value::Object(info)) = export.info else {
        return Err(InvalidCommand::MissingInfo);
    };

    for field in REQUIRED {
        if !info.get(field).is_some_and(Value::is_string) {
            return Err(InvalidCommand::MissingField(field));
        }
    }
    for field in REQUIRED {
        if info
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.trim().is_empty())
        {
            return Err(InvalidCommand::EmptyField(field));
        }
    }

    let info: CommandInfo = serde_json::from_value(Value::Object(info))
        .map_err(|err| InvalidCommand::Malformed(err.to_string()))?;
    Ok((info, handler))
}

/// Runs every command's `init` hook once, in registration order.
///
/// A panicking hook is logged and does not stop the others.
pub async fn initialize(registry: &Registry, bot: &BotContext) {
    for command in registry.iter() {
        let hook = AssertUnwindSafe(command.handler().init(bot)).catch_unwind();
        if let Err(payload) = hook.await {
            error!(
                command = %command.name(),
                error = panic_message(payload.as_ref()).unwrap_or("unknown panic"),
                "Command init hook panicked"
            );
        }
    }
}
