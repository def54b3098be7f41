//! Type registry: the single owner of every named generated type.
//!
//! A name enters the registry at most once. It is reserved before its
//! definition is generated, so a reference reached again while the
//! definition is still being built returns the name without recursing.
//! Insertion order of reservations is the emission order.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::types::TsTypeDef;

#[derive(Debug, Clone)]
enum Slot {
    Reserved,
    Defined(TsTypeDef),
}

/// Named types produced during one generation run.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    entries: IndexMap<String, Slot>,
    /// Canonical name -> source schema name that claimed it.
    sources: HashMap<String, String>,
    /// Reference targets already reported as missing.
    unresolved: HashSet<String>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`. Returns false if it was already reserved or defined.
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), Slot::Reserved);
        true
    }

    /// Store the definition for a name, keeping its original position.
    pub fn define(&mut self, def: TsTypeDef) {
        match self.entries.get_mut(&def.name) {
            Some(slot @ Slot::Reserved) => *slot = Slot::Defined(def),
            Some(Slot::Defined(_)) => {}
            None => {
                self.entries.insert(def.name.clone(), Slot::Defined(def));
            }
        }
    }

    /// Whether `name` is reserved or defined.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Definition stored under `name`, if generation finished.
    pub fn get(&self, name: &str) -> Option<&TsTypeDef> {
        match self.entries.get(name) {
            Some(Slot::Defined(def)) => Some(def),
            _ => None,
        }
    }

    /// Record that `source` maps to `canonical`.
    ///
    /// Returns the earlier source when a different schema already claimed the name.
    pub fn claim(&mut self, canonical: &str, source: &str) -> Option<&str> {
        let owner = self
            .sources
            .entry(canonical.to_string())
            .or_insert_with(|| source.to_string());
        (*owner != source).then_some(owner.as_str())
    }

    /// Remember a missing reference target. Returns true the first time.
    pub fn mark_unresolved(&mut self, target: &str) -> bool {
        self.unresolved.insert(target.to_string())
    }

    /// Whether `target` was already reported as missing.
    pub fn is_unresolved(&self, target: &str) -> bool {
        self.unresolved.contains(target)
    }

    /// Completed definitions in emission order.
    pub fn definitions(&self) -> impl Iterator<Item = &TsTypeDef> {
        self.entries.values().filter_map(|slot| match slot {
            Slot::Defined(def) => Some(def),
            Slot::Reserved => None,
        })
    }

    /// Registered names in emission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the registry into its definitions, in emission order.
    pub fn into_definitions(self) -> Vec<TsTypeDef> {
        self.entries
            .into_values()
            .filter_map(|slot| match slot {
                Slot::Defined(def) => Some(def),
                Slot::Reserved => None,
            })
            .collect()
    }
}
