//! Command registry.
//!
//! The [`Registry`] stores validated [`CommandDescriptor`]s in registration
//! order and indexes them by lower-cased name and alias.  It is filled by the
//! [`Loader`](crate::loader::Loader) and is read-only afterwards: the only
//! mutating method is crate-private, and the dispatcher shares the finished
//! registry behind an `Arc`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use herald_core::CommandDescriptor;

use crate::error::LoadError;

/// In-memory store of validated commands.
#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<Arc<CommandDescriptor>>,
    /// Lower-cased name → index into `commands`.
    names: HashMap<String, usize>,
    /// Lower-cased alias → index into `commands`.
    aliases: HashMap<String, usize>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor unless its name or one of its aliases is taken.
    ///
    /// Both the name and every alias are checked against all existing names
    /// and aliases.  On conflict the registry is left untouched.
    pub(crate) fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), LoadError> {
        let tokens = std::iter::once(descriptor.name())
            .chain(descriptor.aliases().iter().map(String::as_str));
        for token in tokens {
            if let Some(existing) = self.find(token) {
                return Err(LoadError::Duplicate {
                    candidate: descriptor.source().to_string(),
                    token: token.to_string(),
                    existing: existing.source().to_string(),
                });
            }
        }

        let index = self.commands.len();
        self.names.insert(descriptor.name().to_lowercase(), index);
        for alias in descriptor.aliases() {
            if let Entry::Vacant(slot) = self.aliases.entry(alias.to_lowercase()) {
                slot.insert(index);
            }
        }
        self.commands.push(Arc::new(descriptor));
        Ok(())
    }

    /// Resolves a command by name, then by alias, ignoring case.
    pub fn find(&self, token: &str) -> Option<&Arc<CommandDescriptor>> {
        let key = token.to_lowercase();
        self.names
            .get(&key)
            .or_else(|| self.aliases.get(&key))
            .map(|&index| &self.commands[index])
    }

    /// Snapshot of all commands in registration order.
    pub fn list(&self) -> Vec<Arc<CommandDescriptor>> {
        self.commands.clone()
    }

    /// Iterates over commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.commands.iter()
    }

    /// Primary names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
