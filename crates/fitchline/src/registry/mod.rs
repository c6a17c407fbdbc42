//! The rule registry: catalog of rules and theorems, compiled for
//! forward and backward application

pub mod catalog;
pub mod compile;
pub mod roth;

pub use catalog::builtin_registry;
pub use compile::{compile, BackwardStructure, ForwardStructure, Obligation, Slot};
pub use roth::Roth;

use crate::error::EngineError;
use indexmap::IndexMap;

/// A roth together with its compiled application structures
#[derive(Debug, Clone)]
pub struct CompiledRoth {
    pub roth: Roth,
    pub forward: ForwardStructure,
    pub backward: BackwardStructure,
}

/// In-memory catalog of rules and theorems, keyed by id.
///
/// Rules are loaded once at startup and are immutable thereafter; theorem
/// export appends through the single `register` entry point, whose `&mut`
/// receiver serializes all mutation.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, CompiledRoth>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            entries: IndexMap::new(),
        }
    }

    /// Validate, compile, and insert. A duplicate id rejects this record
    /// and leaves the registry unchanged.
    pub fn register(&mut self, roth: Roth) -> Result<(), EngineError> {
        roth.validate()?;
        if self.entries.contains_key(&roth.id) {
            return Err(EngineError::RegistryConflict(roth.id));
        }
        let (forward, backward) = compile(&roth);
        self.entries.insert(
            roth.id.clone(),
            CompiledRoth {
                roth,
                forward,
                backward,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CompiledRoth> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn roths(&self) -> impl Iterator<Item = &Roth> {
        self.entries.values().map(|entry| &entry.roth)
    }

    /// Registered theorems in insertion order
    pub fn theorems(&self) -> impl Iterator<Item = &Roth> {
        self.roths().filter(|roth| roth.is_theorem())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
