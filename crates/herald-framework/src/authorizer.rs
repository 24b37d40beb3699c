//! Permission and ownership checks.

use herald_core::{CommandDescriptor, CommandInfo, Member};

use crate::config::DispatchConfig;
use crate::error::Denial;

/// Decides whether a member may run a command.
#[derive(Debug, Clone)]
pub struct Authorizer {
    owner_id: String,
}

impl Authorizer {
    /// Creates an authorizer for the configured owner.
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            owner_id: config.effective_owner_id().to_string(),
        }
    }

    /// The identity allowed to run owner-only commands.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Checks `member` against the command's requirements.
    pub fn check(&self, command: &CommandDescriptor, member: &dyn Member) -> Result<(), Denial> {
        authorize(command.info(), member, &self.owner_id)
    }
}

/// Permissions are checked in declaration order and the first missing one is
/// reported.  The owner check comes after all permissions pass.
pub fn authorize(info: &CommandInfo, member: &dyn Member, owner_id: &str) -> Result<(), Denial> {
    if let Some(missing) = info
        .permissions
        .iter()
        .find(|permission| !member.has_permission(permission))
    {
        return Err(Denial::MissingPermission(missing.clone()));
    }
    if info.owner_only && member.id() != owner_id {
        return Err(Denial::OwnerOnly);
    }
    Ok(())
}
