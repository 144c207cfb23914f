//! Explicit registry of named targets.
//!
//! The host embeds a registry in its own configuration object and resolves
//! targets by plugin name; nothing registers itself through ambient global
//! state.

use std::{collections::HashMap, sync::Arc};

use crate::target::Target;

#[derive(Default)]
pub struct TargetRegistry {
    targets: HashMap<String, Arc<dyn Target>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target under its plugin name, replacing and returning
    /// any previously registered target with that name.
    pub fn register(&mut self, target: Arc<dyn Target>) -> Option<Arc<dyn Target>> {
        self.targets.insert(target.name().to_owned(), target)
    }

    /// Looks a registered target up by plugin name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Target>> {
        self.targets.get(name)
    }

    /// Names of all registered targets.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
