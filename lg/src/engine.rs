//! Template engine abstractions and the engine registry
//!
//! The registry is an explicit, injectable cache from resource identifier to a
//! loaded engine. Keys are compared case-insensitively. Concurrent first access
//! to the same key builds the engine at most once; lookups after that only take
//! the map's read lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::import::ImportResolve;

/// A loaded template collection that can evaluate templates by name
pub trait TemplateEngine: Send + Sync {
    /// Evaluate `template` against `data`
    ///
    /// The error is the engine's template-level message; callers decide whether
    /// it is fatal.
    fn evaluate(&self, template: &str, data: &Value) -> std::result::Result<String, String>;

    /// Names of the templates this engine can evaluate
    fn templates(&self) -> Vec<String>;
}

/// Builds engines for resource identifiers
pub trait EngineLoader: Send + Sync {
    fn load(&self, resource_id: &str, imports: &dyn ImportResolve) -> Result<Arc<dyn TemplateEngine>>;
}

/// Shared handle to a loaded engine
pub type EngineHandle = Arc<dyn TemplateEngine>;

#[derive(Default)]
struct Slot {
    engine: OnceLock<EngineHandle>,
    building: Mutex<()>,
}

/// Resource identifier -> engine cache with get-or-create semantics
#[derive(Default)]
pub struct EngineRegistry {
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry").field("keys", &self.keys()).finish()
    }
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded engine for `id`, if any
    pub fn get(&self, id: &str) -> Option<EngineHandle> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(&registry_key(id)).and_then(|slot| slot.engine.get().cloned())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Register an already-built engine unless one is loaded for `id`
    ///
    /// Returns the engine stored under `id`, which is `engine` unless another
    /// one was loaded first.
    pub fn insert(&self, id: &str, engine: EngineHandle) -> EngineHandle {
        let slot = self.slot(id);
        slot.engine.get_or_init(|| engine).clone()
    }

    /// Engine for `id`, building it with `build` on first access
    ///
    /// At most one `build` runs per key; concurrent callers for the same key
    /// wait for it and share the result. A failed build leaves the key empty so
    /// a later call can try again.
    pub fn get_or_try_insert_with<F>(&self, id: &str, build: F) -> Result<EngineHandle>
    where
        F: FnOnce() -> Result<EngineHandle>,
    {
        let slot = self.slot(id);
        if let Some(engine) = slot.engine.get() {
            return Ok(engine.clone());
        }

        let _guard = slot.building.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = slot.engine.get() {
            debug!(%id, "EngineRegistry::get_or_try_insert_with: built by another caller");
            return Ok(engine.clone());
        }

        debug!(%id, "EngineRegistry::get_or_try_insert_with: building engine");
        let engine = build()?;
        let engine = slot.engine.get_or_init(|| engine).clone();
        info!("Loaded template engine for {}", id);
        Ok(engine)
    }

    /// Engine for `id`, loading it through `loader` on first access
    pub fn get_or_load(&self, id: &str, loader: &dyn EngineLoader, imports: &dyn ImportResolve) -> Result<EngineHandle> {
        self.get_or_try_insert_with(id, || loader.load(id, imports))
    }

    /// Identifiers with a loaded engine, sorted
    pub fn keys(&self) -> Vec<String> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.engine.get().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &str) -> Arc<Slot> {
        let key = registry_key(id);
        {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = slots.get(&key) {
                return slot.clone();
            }
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key).or_default().clone()
    }
}

fn registry_key(id: &str) -> String {
    id.replace('\\', "/").to_lowercase()
}
