//! # protolazy-loader — On-Demand Schema Module Loading
//!
//! Makes generated schema modules importable by logical name, compiling the
//! backing `.proto` file the first time a module is requested:
//!
//! ```text
//! ModuleRegistry::import_module("a.b.Msg_pb2")
//!   -> ProtoFinder     name -> a/b/Msg.proto, stat each search root
//!   -> ProtoLoader     cache hit? install : compile, import deps, install
//!   -> Namespace       bindings installed once, imports resolved
//! ```
//!
//! - [`search`] — ordered search roots with scoped augmentation.
//! - [`cache`] — generated code by module name, shared by both finders.
//! - [`compiler`] — the external compiler contract and its command adapter.
//! - [`host`] — the module registry, finder chain and import lock.
//! - [`finder`] / [`loader`] — the schema-specific finder and loader.
//! - [`namespace`] — loaded modules and their bindings.
//! - [`api`] — wiring and load-by-path helpers.
//!
//! ## Crate Policy
//!
//! - Everything runs on the calling thread; the host's import lock
//!   serialises first loads across threads.
//! - Compiler output is never executed, only installed through
//!   [`Namespace`] calls.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod api;
pub mod cache;
pub mod compiler;
pub mod finder;
pub mod host;
pub mod loader;
pub mod namespace;
pub mod search;

pub use api::{get_protos, get_protos_and_services, get_services, install, registry_from_config};
pub use cache::CompilationCache;
pub use compiler::{CommandCompiler, CompileFailure, Compiler};
pub use finder::{PendingLoad, ProtoFinder};
pub use host::{Finder, Loader, ModuleHost, ModuleRegistry, ModuleSpec};
pub use loader::ProtoLoader;
pub use namespace::{Module, ModuleHandle, Namespace, Symbol};
pub use search::{AugmentGuard, SearchRoots};
