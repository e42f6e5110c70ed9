//! # Generated Code Model
//!
//! The compiler does not hand back executable text. Each generated module is
//! described as an ordered list of top-level bindings that a loader installs
//! into a module namespace through explicit API calls.
//!
//! A compilation yields a sequence of [`GeneratedUnit`]s: the target's
//! transitive dependencies first, in dependency-then-dependent order, and the
//! target itself last.

use serde::{Deserialize, Serialize};

use crate::error::NameError;
use crate::name::{LogicalModuleName, NameTranslator};

/// One generated module as emitted by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    /// Forward-slash generated-file path, e.g. `a/b/Dep_pb2.py`.
    pub path: String,
    /// Bindings the module defines.
    pub code: GeneratedCode,
}

impl GeneratedUnit {
    /// Create a unit from a generated-file path and its code.
    pub fn new(path: impl Into<String>, code: GeneratedCode) -> Self {
        Self {
            path: path.into(),
            code,
        }
    }

    /// The logical name of the module this unit generates.
    pub fn module_name(&self) -> Result<LogicalModuleName, NameError> {
        NameTranslator::generated_file_to_name(&self.path)
    }
}

/// The top-level bindings of one generated module, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedCode {
    bindings: Vec<Binding>,
}

impl GeneratedCode {
    /// Create code from an ordered list of bindings.
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Append a binding, builder style.
    pub fn with(mut self, name: impl Into<String>, value: BindingValue) -> Self {
        self.bindings.push(Binding {
            name: name.into(),
            value,
        });
        self
    }

    /// The bindings in definition order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the module defines nothing.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Modules this code imports symbols from, in first-use order.
    pub fn imported_modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = Vec::new();
        for binding in &self.bindings {
            if let BindingValue::Import { module, .. } = &binding.value {
                if !modules.contains(&module.as_str()) {
                    modules.push(module);
                }
            }
        }
        modules
    }
}

/// A single named top-level binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Name the binding is installed under.
    pub name: String,
    /// What the name is bound to.
    pub value: BindingValue,
}

/// The value side of a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingValue {
    /// A generated message or enum type.
    Type {
        /// Fully-qualified schema name, e.g. `a.b.Msg`.
        full_name: String,
    },
    /// A generated service stub.
    Service {
        /// Fully-qualified service name.
        full_name: String,
        /// Method names in declaration order.
        #[serde(default)]
        methods: Vec<String>,
    },
    /// A constant value.
    Constant {
        /// The constant, as arbitrary JSON.
        value: serde_json::Value,
    },
    /// A symbol re-exported from another generated module.
    ///
    /// Resolved at install time, so `module` must already be loaded.
    Import {
        /// Logical name of the defining module.
        module: String,
        /// Symbol name inside that module.
        symbol: String,
    },
}

impl BindingValue {
    /// Returns the variant identifier string.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::Service { .. } => "service",
            Self::Constant { .. } => "constant",
            Self::Import { .. } => "import",
        }
    }
}
