//! Command registry.
//!
//! The `Registry` owns the name → command table. Registration is a single
//! check-and-insert under one lock, so concurrent attempts to register the
//! same name produce exactly one winner. Entries are never removed.

use super::traits::{Command, CommandSchema};
use crate::error::RegistryError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;

/// Registry of bot commands.
#[derive(Default)]
pub struct Registry {
    commands: Mutex<HashMap<String, Arc<dyn Command>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name.
    ///
    /// Fails with `InvalidInput` for an empty name and `AlreadyRegistered` if
    /// the name is taken. Names are compared exactly.
    pub fn register(&self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        let name = command.name();
        if name.is_empty() {
            return Err(RegistryError::InvalidInput("command name is empty"));
        }

        let mut commands = self.commands.lock();
        match commands.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(name.to_string())),
            Entry::Vacant(slot) => {
                debug!(command = %name, "Registered command");
                slot.insert(Arc::clone(&command));
                Ok(())
            }
        }
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.lock().get(name).cloned()
    }

    /// Schemas for every registered command, sorted by name.
    pub fn application_commands(&self) -> Vec<CommandSchema> {
        let commands: Vec<Arc<dyn Command>> = self.commands.lock().values().cloned().collect();
        let mut schemas: Vec<CommandSchema> = commands.iter().map(|c| c.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }
}
