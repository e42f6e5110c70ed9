//! # Compilation Cache
//!
//! Maps a logical module name to the generated code the compiler produced
//! for it. The loader stores a dependency's code here before importing that
//! dependency through the host, so that the dependency's own load is served
//! from the cache instead of a second compiler run.
//!
//! ## Invariants
//!
//! - Entries are written once and never updated or evicted.
//! - Check-then-insert is atomic: concurrent inserts of the same name keep
//!   the first value.
//! - A failed compilation never produces an entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use protolazy_core::{GeneratedCode, LogicalModuleName};

/// Process- or test-scoped cache of generated code by module name.
#[derive(Debug, Default)]
pub struct CompilationCache {
    entries: Mutex<HashMap<LogicalModuleName, Arc<GeneratedCode>>>,
}

impl CompilationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache ready to be shared between finders.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Look up the cached code for a module.
    pub fn get(&self, name: &str) -> Option<Arc<GeneratedCode>> {
        self.entries.lock().get(name).cloned()
    }

    /// Returns true if code for `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    /// Store `code` under `name` unless an entry already exists.
    ///
    /// Returns the entry that is cached once the call completes, which is
    /// the pre-existing one if another caller got there first.
    pub fn insert_if_absent(
        &self,
        name: LogicalModuleName,
        code: GeneratedCode,
    ) -> Arc<GeneratedCode> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(name.as_str()) {
            return Arc::clone(existing);
        }
        tracing::debug!(module = %name, bindings = code.len(), "caching generated code");
        let code = Arc::new(code);
        entries.insert(name, Arc::clone(&code));
        code
    }

    /// Returns the number of cached modules.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Names of all cached modules, sorted.
    pub fn names(&self) -> Vec<LogicalModuleName> {
        let mut names: Vec<LogicalModuleName> = self.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }
}
