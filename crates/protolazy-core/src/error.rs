//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout protolazy. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - "No finder can supply this name" is not an error at the finder
//!   boundary. Finders return `None`; only the host turns an exhausted
//!   finder chain into [`LoadError::ModuleNotFound`].
//! - Compiler diagnostics are carried verbatim.
//! - Integrity errors are internal invariant violations and abort the load.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for module resolution and loading.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No registered finder could locate a source for the requested name.
    #[error("no module named '{name}'")]
    ModuleNotFound {
        /// The logical name that was requested.
        name: String,
    },

    /// The external compiler rejected the schema.
    #[error("failed to compile '{}' for module '{name}':\n{diagnostics}", .source_path.display())]
    Compilation {
        /// The logical module name being loaded.
        name: String,
        /// Relative schema path handed to the compiler.
        source_path: PathBuf,
        /// Compiler diagnostic text, unmodified.
        diagnostics: String,
    },

    /// Internal invariant violation in the load protocol.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Generated code referenced a symbol that no loaded module defines.
    #[error("module '{importer}' imports '{symbol}' from '{module}', which does not define it")]
    UnresolvedImport {
        /// Module whose bindings were being installed.
        importer: String,
        /// Module the symbol was expected in.
        module: String,
        /// The missing symbol.
        symbol: String,
    },

    /// A logical name or schema path could not be translated.
    #[error("name error: {0}")]
    Name(#[from] NameError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error translating between logical module names and schema paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name or path had no usable segments.
    #[error("'{0}' has no segments")]
    Empty(String),

    /// A dotted name contained an empty segment (`a..b`, `.a`, `a.`).
    #[error("'{0}' contains an empty segment")]
    EmptySegment(String),

    /// The final segment does not carry the expected kind suffix.
    #[error("'{name}' does not end with suffix '{suffix}'")]
    MissingSuffix {
        /// The offending name.
        name: String,
        /// The suffix the translator expects.
        suffix: String,
    },

    /// Stripping the suffix left nothing to name the schema file with.
    #[error("'{0}' has an empty schema base name")]
    EmptyBase(String),

    /// The path is absolute or climbs out of its root (`..`).
    #[error("path '{0}' must be relative and must not contain '..'")]
    NotRelative(String),

    /// A name segment is not a plain file name (contains a path separator,
    /// a root, or a drive prefix).
    #[error("'{name}' has segment '{segment}' that is not a plain file name")]
    SegmentNotPlain {
        /// The offending name.
        name: String,
        /// The segment that would escape its directory.
        segment: String,
    },

    /// The path is not valid UTF-8 and cannot become a module name.
    #[error("path '{0}' is not valid UTF-8")]
    NonUtf8Path(String),
}

/// Error loading [`LoaderConfig`](crate::config::LoaderConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration document is not valid YAML for the schema.
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration '{}': {source}", .path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_error_carries_diagnostics_verbatim() {
        let err = LoadError::Compilation {
            name: "a.b.Msg_pb2".to_string(),
            source_path: PathBuf::from("a/b/Msg.proto"),
            diagnostics: "a/b/Msg.proto:3:1: Expected \"message\".".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a.b.Msg_pb2"));
        assert!(msg.contains("a/b/Msg.proto:3:1: Expected \"message\"."));
    }

    #[test]
    fn module_not_found_display() {
        let err = LoadError::ModuleNotFound {
            name: "missing_pb2".to_string(),
        };
        assert_eq!(err.to_string(), "no module named 'missing_pb2'");
    }

    #[test]
    fn name_error_converts_into_load_error() {
        let err: LoadError = NameError::EmptyBase("_pb2".to_string()).into();
        assert!(matches!(err, LoadError::Name(NameError::EmptyBase(_))));
    }

    #[test]
    fn unresolved_import_display_names_all_parties() {
        let err = LoadError::UnresolvedImport {
            importer: "a.Msg_pb2".to_string(),
            module: "a.Dep_pb2".to_string(),
            symbol: "Dep".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a.Msg_pb2"));
        assert!(msg.contains("a.Dep_pb2"));
        assert!(msg.contains("Dep"));
    }
}
