//! # protolazy-core — Foundational Types
//!
//! Defines the vocabulary shared by the loader and the CLI:
//!
//! - [`LogicalModuleName`] and [`ModuleKind`] — dotted module names and the
//!   two kind suffixes (`_pb2` for messages, `_pb2_grpc` for services).
//! - [`NameTranslator`] — name ↔ schema path translation. The source-path and
//!   generated-path directions use different separator rules; see
//!   [`name`] for the table.
//! - [`GeneratedUnit`] / [`GeneratedCode`] — the binding description the
//!   external compiler emits for each generated module.
//! - [`LoadError`] — the error taxonomy of the load protocol.
//! - [`LoaderConfig`] — search roots and compiler command.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `protolazy-*` crates (this is the leaf of the DAG).
//! - No I/O outside [`config`].
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod codegen;
pub mod config;
pub mod error;
pub mod name;

// Re-export primary types for ergonomic imports.
pub use codegen::{Binding, BindingValue, GeneratedCode, GeneratedUnit};
pub use config::{CompilerConfig, LoaderConfig};
pub use error::{ConfigError, LoadError, NameError};
pub use name::{
    LogicalModuleName, ModuleKind, NameTranslator, MESSAGES_SUFFIX, SCHEMA_EXTENSION,
    SERVICES_SUFFIX,
};
