//! Error types for the Herald framework.

use thiserror::Error;

/// Why a candidate's export failed structural validation.
///
/// Checks run in declaration order and the first failure wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCommand {
    /// The candidate exported nothing.
    #[error("Exports are empty")]
    EmptyExports,

    /// No handler.
    #[error("Missing run function")]
    MissingRun,

    /// No `info`, or `info` is not a JSON object.
    #[error("Missing info object")]
    MissingInfo,

    /// A required text field is absent or not a string.
    #[error("Info object missing \"{0}\"")]
    MissingField(&'static str),

    /// A required text field is blank.
    #[error("Info object has empty \"{0}\"")]
    EmptyField(&'static str),

    /// An optional field has the wrong shape.
    #[error("Malformed info object: {0}")]
    Malformed(String),
}

/// A candidate rejected during loading.
///
/// Load errors are reported and collected, never fatal to the batch.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The candidate's loader returned an error or panicked.
    #[error("Failed to load command '{candidate}': {reason}")]
    Failed {
        /// Candidate identifier.
        candidate: String,
        /// Error detail.
        reason: String,
    },

    /// The export failed validation.
    #[error("Error in '{candidate}': {reason}")]
    Invalid {
        /// Candidate identifier.
        candidate: String,
        /// The first failed check.
        reason: InvalidCommand,
    },

    /// A name or alias is already owned by an earlier command.
    #[error(
        "Duplicate command: An entry already exists for command {token} in '{candidate}' \
         (registered by '{existing}')"
    )]
    Duplicate {
        /// Candidate identifier of the rejected command.
        candidate: String,
        /// The conflicting name or alias.
        token: String,
        /// Candidate identifier of the command that keeps the token.
        existing: String,
    },
}

impl LoadError {
    /// Identifier of the rejected candidate.
    pub fn candidate(&self) -> &str {
        match self {
            Self::Failed { candidate, .. }
            | Self::Invalid { candidate, .. }
            | Self::Duplicate { candidate, .. } => candidate,
        }
    }
}

/// Why a caller may not run a command.
///
/// The `Display` text is what the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// The caller lacks a required permission.
    #[error("You need the permission `{0}` to use this command.")]
    MissingPermission(String),

    /// The command is reserved for the bot owner.
    #[error("Only the owner of the bot can use this command.")]
    OwnerOnly,
}
