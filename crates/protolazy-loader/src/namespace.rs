//! # Module Namespaces
//!
//! A loaded module is a named, initially empty namespace that the loader
//! populates exactly once from a [`GeneratedCode`] description.
//!
//! `Import` bindings are resolved at install time against modules the host
//! already has registered, so a target can only be installed after the
//! dependencies it re-exports from. A missing module or symbol is a
//! [`LoadError::UnresolvedImport`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use protolazy_core::{BindingValue, GeneratedCode, LoadError, LogicalModuleName};
use serde::Serialize;

use crate::host::ModuleHost;

/// Shared handle to a registered module.
pub type ModuleHandle = Arc<Module>;

/// A value bound in a namespace, tagged with the module that defined it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    /// Logical name of the module whose generated code produced the value.
    pub origin: String,
    /// The bound value. Never an `Import`: imports are resolved on install.
    pub value: BindingValue,
}

/// Top-level bindings of one module, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    symbols: BTreeMap<String, Symbol>,
}

impl Namespace {
    /// Bind `name`, replacing any earlier binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.symbols.insert(name.into(), symbol);
    }

    /// Look up a symbol.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Returns true if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    /// Iterate over `(name, symbol)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug, Default)]
struct ModuleState {
    namespace: Namespace,
    populated: bool,
}

/// A module known to the host.
#[derive(Debug)]
pub struct Module {
    name: LogicalModuleName,
    origin: Option<PathBuf>,
    state: RwLock<ModuleState>,
}

impl Module {
    /// Create an empty, unpopulated module.
    pub fn new(name: LogicalModuleName, origin: Option<PathBuf>) -> Self {
        Self {
            name,
            origin,
            state: RwLock::new(ModuleState::default()),
        }
    }

    /// The module's logical name.
    pub fn name(&self) -> &LogicalModuleName {
        &self.name
    }

    /// The schema file the module was loaded from, when known.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Returns true once bindings have been installed.
    pub fn is_populated(&self) -> bool {
        self.state.read().populated
    }

    /// Look up a single symbol.
    pub fn get(&self, symbol: &str) -> Option<Symbol> {
        self.state.read().namespace.get(symbol).cloned()
    }

    /// Snapshot of the module's namespace.
    pub fn namespace(&self) -> Namespace {
        self.state.read().namespace.clone()
    }

    /// Populate the module from generated code.
    ///
    /// # Errors
    ///
    /// - [`LoadError::UnresolvedImport`] if an `Import` names a module that is
    ///   not registered with `host` or a symbol that module does not define.
    ///   Nothing is installed in that case.
    /// - [`LoadError::Integrity`] if the module was already populated.
    pub fn install(&self, code: &GeneratedCode, host: &dyn ModuleHost) -> Result<(), LoadError> {
        // Resolve first so that no lock on this module is held while other
        // modules are read.
        let mut resolved = Namespace::default();
        for binding in code.bindings() {
            let symbol = match &binding.value {
                BindingValue::Import { module, symbol } => host
                    .lookup(module)
                    .and_then(|m| m.get(symbol))
                    .ok_or_else(|| LoadError::UnresolvedImport {
                        importer: self.name.to_string(),
                        module: module.clone(),
                        symbol: symbol.clone(),
                    })?,
                value => Symbol {
                    origin: self.name.to_string(),
                    value: value.clone(),
                },
            };
            resolved.define(binding.name.clone(), symbol);
        }

        let mut state = self.state.write();
        if state.populated {
            return Err(LoadError::Integrity(format!(
                "module '{}' is already populated",
                self.name
            )));
        }
        state.namespace = resolved;
        state.populated = true;
        Ok(())
    }
}
