//! # Host Module Registry
//!
//! The host owns the set of registered modules, the ordered finder chain and
//! the search roots. Importing a name that is not yet registered asks each
//! finder in turn for a [`ModuleSpec`]; the first finder that answers wins.
//! The host then creates an empty module under the requested name, registers
//! it, and hands it to the spec's [`Loader`]. If the loader fails, the module
//! is unregistered again so that a later import starts from scratch.
//!
//! ## Locking
//!
//! A single re-entrant import lock covers "check registered, find, create,
//! register, exec". Concurrent first imports of one name therefore produce
//! exactly one load, while a loader importing its dependencies from the same
//! thread re-enters the lock.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use protolazy_core::{LoadError, LogicalModuleName};

use crate::namespace::{Module, ModuleHandle};
use crate::search::SearchRoots;

/// The registry operations a loader relies on.
pub trait ModuleHost: Send + Sync {
    /// Returns true if a module named `name` is registered.
    fn is_registered(&self, name: &str) -> bool;

    /// The registered module named `name`, if any.
    fn lookup(&self, name: &str) -> Option<ModuleHandle>;

    /// Return the registered module, loading it through the finder chain
    /// first if necessary.
    fn import_module(&self, name: &str) -> Result<ModuleHandle, LoadError>;

    /// Copy of the current search roots, in priority order.
    fn search_roots(&self) -> Vec<PathBuf>;
}

/// Locates a loadable source for a module name.
///
/// Returning `None` means "not mine"; the host moves on to the next finder.
pub trait Finder: Send + Sync {
    /// Look for `name` under `roots`.
    fn find_spec(&self, name: &str, roots: &[PathBuf]) -> Option<ModuleSpec>;
}

/// Populates a freshly created module. Consumed by the load.
pub trait Loader: Send {
    /// Populate `module`, which the host has already registered.
    fn exec_module(self: Box<Self>, module: &ModuleHandle, host: &dyn ModuleHost) -> Result<(), LoadError>;
}

/// A finder's answer: where a module comes from and how to load it.
pub struct ModuleSpec {
    /// Name the finder resolved.
    pub name: LogicalModuleName,
    /// Source file backing the module, when there is one.
    pub origin: Option<PathBuf>,
    /// Loader that populates the module.
    pub loader: Box<dyn Loader>,
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// In-memory module registry with a pluggable finder chain.
#[derive(Default)]
pub struct ModuleRegistry {
    import_lock: ReentrantMutex<()>,
    modules: RwLock<HashMap<LogicalModuleName, ModuleHandle>>,
    finders: RwLock<Vec<Arc<dyn Finder>>>,
    roots: SearchRoots,
    load_order: Mutex<Vec<LogicalModuleName>>,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.modules.read().len())
            .field("finders", &self.finders.read().len())
            .field("roots", &self.roots.snapshot())
            .finish()
    }
}

impl ModuleRegistry {
    /// Create a registry with no finders and no search roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry searching `roots` in order.
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: SearchRoots::new(roots),
            ..Self::default()
        }
    }

    /// The registry's search roots.
    pub fn roots(&self) -> &SearchRoots {
        &self.roots
    }

    /// Append a finder to the end of the chain.
    pub fn add_finder(&self, finder: Arc<dyn Finder>) {
        self.finders.write().push(finder);
    }

    /// Number of finders in the chain.
    pub fn finder_count(&self) -> usize {
        self.finders.read().len()
    }

    /// Create an empty module. It is not registered.
    pub fn create_empty_module(&self, name: LogicalModuleName, origin: Option<PathBuf>) -> ModuleHandle {
        Arc::new(Module::new(name, origin))
    }

    /// Register `module` under its own name, replacing any previous entry.
    pub fn register_module(&self, module: ModuleHandle) {
        self.modules.write().insert(module.name().clone(), module);
    }

    /// Remove a module from the registry, returning it if it was present.
    pub fn unregister_module(&self, name: &str) -> Option<ModuleHandle> {
        self.modules.write().remove(name)
    }

    /// Names of modules in the order their loads completed.
    ///
    /// A dependency always completes before the module that imported it.
    pub fn load_order(&self) -> Vec<LogicalModuleName> {
        self.load_order.lock().clone()
    }

    /// Run `f` with `extra` appended to the search roots.
    ///
    /// The import lock is held throughout, so no other thread imports
    /// against the augmented roots. The previous roots are restored when `f`
    /// returns or unwinds.
    pub fn with_search_roots<R>(&self, extra: &[PathBuf], f: impl FnOnce(&Self) -> R) -> R {
        let _lock = self.import_lock.lock();
        let _restore = self.roots.augment(extra);
        f(self)
    }

    fn find(&self, name: &LogicalModuleName) -> Option<ModuleSpec> {
        let roots = self.roots.snapshot();
        let finders = self.finders.read().clone();
        finders.iter().find_map(|finder| finder.find_spec(name.as_str(), &roots))
    }
}

impl ModuleHost for ModuleRegistry {
    fn is_registered(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    fn lookup(&self, name: &str) -> Option<ModuleHandle> {
        self.modules.read().get(name).cloned()
    }

    fn import_module(&self, name: &str) -> Result<ModuleHandle, LoadError> {
        let _lock = self.import_lock.lock();
        if let Some(module) = self.lookup(name) {
            return Ok(module);
        }

        let name = LogicalModuleName::new(name)?;
        let spec = self.find(&name).ok_or_else(|| LoadError::ModuleNotFound {
            name: name.to_string(),
        })?;
        if spec.name != name {
            tracing::debug!(requested = %name, resolved = %spec.name, "finder resolved a different name");
        }

        let module = self.create_empty_module(name.clone(), spec.origin);
        self.register_module(Arc::clone(&module));

        match spec.loader.exec_module(&module, self) {
            Ok(()) => {
                tracing::info!(module = %name, "module loaded");
                self.load_order.lock().push(name);
                Ok(module)
            }
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "module load failed");
                self.unregister_module(name.as_str());
                Err(e)
            }
        }
    }

    fn search_roots(&self) -> Vec<PathBuf> {
        self.roots.snapshot()
    }
}
