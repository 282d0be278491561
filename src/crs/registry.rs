//! Caller-owned CRS registries
//!
//! A registry memoizes name lookups so the resolver is not asked about a
//! name again once it is stored. `CrsRegistry` is a plain map for single-task use;
//! `SharedCrsRegistry` is a cloneable handle for concurrent tasks.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::coordinate::CrsDescriptor;
use crate::crs::definitions::{builtin_definitions, CrsDefinitions};
use crate::document::errors::{ReprojError, ReprojResult};

/// Name -> descriptor storage used during resolution
pub trait CrsCache {
    /// Descriptor registered under exactly `name`
    fn lookup(&self, name: &str) -> Option<CrsDescriptor>;

    /// Store `crs` under `name` unless another entry won the race
    ///
    /// Returns the descriptor that ends up registered.
    fn memoize(&mut self, name: &str, crs: CrsDescriptor) -> CrsDescriptor;
}

/// Map of CRS names to descriptors
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    entries: HashMap<String, CrsDescriptor>,
}

impl CrsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the crate's built-in definitions
    pub fn with_builtin_definitions() -> ReprojResult<Self> {
        Self::from_definitions(builtin_definitions())
    }

    /// Registry holding every definition and alias of `defs`
    pub fn from_definitions(defs: &CrsDefinitions) -> ReprojResult<Self> {
        let mut registry = CrsRegistry::new();
        registry.extend_from_definitions(defs)?;
        Ok(registry)
    }

    /// Parse and register every definition and alias of `defs`
    ///
    /// Existing entries with the same names are replaced.
    pub fn extend_from_definitions(&mut self, defs: &CrsDefinitions) -> ReprojResult<()> {
        for (name, definition) in defs.definitions() {
            let crs = CrsDescriptor::from_definition(definition)
                .map_err(|e| ReprojError::Config(format!("Definition '{}': {}", name, e)))?;
            self.insert(name, crs);
        }
        for (alias, target) in defs.aliases() {
            if let Some(crs) = self.get(target).cloned() {
                self.insert(alias, crs);
            }
        }
        debug!("Registry now holds {} CRS names", self.entries.len());
        Ok(())
    }

    /// Register or replace a descriptor
    pub fn insert(&mut self, name: &str, crs: CrsDescriptor) {
        self.entries.insert(name.to_string(), crs);
    }

    /// Descriptor registered under `name`
    pub fn get(&self, name: &str) -> Option<&CrsDescriptor> {
        self.entries.get(name)
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CrsCache for CrsRegistry {
    fn lookup(&self, name: &str) -> Option<CrsDescriptor> {
        self.entries.get(name).cloned()
    }

    fn memoize(&mut self, name: &str, crs: CrsDescriptor) -> CrsDescriptor {
        self.entries.entry(name.to_string()).or_insert(crs).clone()
    }
}

/// Registry handle that can be cloned into concurrently running tasks
///
/// Lookups take a read lock; memoization inserts only if the name is still
/// absent, so racing resolutions of one name agree on a single descriptor.
#[derive(Debug, Clone, Default)]
pub struct SharedCrsRegistry {
    inner: Arc<RwLock<CrsRegistry>>,
}

impl SharedCrsRegistry {
    /// Create an empty shared registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<CrsRegistry> for SharedCrsRegistry {
    fn from(registry: CrsRegistry) -> Self {
        SharedCrsRegistry {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}

impl CrsCache for SharedCrsRegistry {
    fn lookup(&self, name: &str) -> Option<CrsDescriptor> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(name)
    }

    fn memoize(&mut self, name: &str, crs: CrsDescriptor) -> CrsDescriptor {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .memoize(name, crs)
    }
}
