//! # Convenience API
//!
//! Wires the two schema finders into a [`ModuleRegistry`] and loads modules
//! by schema path instead of by logical name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use protolazy_core::{LoadError, LoaderConfig, ModuleKind};

use crate::cache::CompilationCache;
use crate::compiler::{CommandCompiler, Compiler};
use crate::finder::ProtoFinder;
use crate::host::{ModuleHost, ModuleRegistry};
use crate::namespace::ModuleHandle;

/// Append the messages and services finders to `registry`'s finder chain.
///
/// Both finders share `cache`, so a dependency compiled on behalf of one
/// kind is served to the other without recompiling.
pub fn install(
    registry: &ModuleRegistry,
    messages: Arc<dyn Compiler>,
    services: Arc<dyn Compiler>,
    cache: Arc<CompilationCache>,
) {
    registry.add_finder(Arc::new(ProtoFinder::new(
        ModuleKind::Messages,
        messages,
        Arc::clone(&cache),
    )));
    registry.add_finder(Arc::new(ProtoFinder::new(ModuleKind::Services, services, cache)));
    tracing::debug!(finders = registry.finder_count(), "schema finders installed");
}

/// Build a registry searching the configured roots, with both finders
/// backed by the configured compiler command.
pub fn registry_from_config(config: &LoaderConfig) -> ModuleRegistry {
    let registry = ModuleRegistry::with_roots(config.search_roots.iter().cloned());
    install(
        &registry,
        Arc::new(CommandCompiler::from_config(&config.compiler, ModuleKind::Messages)),
        Arc::new(CommandCompiler::from_config(&config.compiler, ModuleKind::Services)),
        CompilationCache::shared(),
    );
    registry
}

/// Load the messages module for the schema at `proto_path`.
///
/// `include_paths` are searched after the registry's own roots, for the
/// duration of this call only.
pub fn get_protos(
    registry: &ModuleRegistry,
    proto_path: &Path,
    include_paths: &[PathBuf],
) -> Result<ModuleHandle, LoadError> {
    import_kind(registry, ModuleKind::Messages, proto_path, include_paths)
}

/// Load the services module for the schema at `proto_path`.
///
/// The messages module is loaded first.
pub fn get_services(
    registry: &ModuleRegistry,
    proto_path: &Path,
    include_paths: &[PathBuf],
) -> Result<ModuleHandle, LoadError> {
    get_protos(registry, proto_path, include_paths)?;
    import_kind(registry, ModuleKind::Services, proto_path, include_paths)
}

/// Load both modules for the schema at `proto_path`.
pub fn get_protos_and_services(
    registry: &ModuleRegistry,
    proto_path: &Path,
    include_paths: &[PathBuf],
) -> Result<(ModuleHandle, ModuleHandle), LoadError> {
    let protos = get_protos(registry, proto_path, include_paths)?;
    let services = get_services(registry, proto_path, include_paths)?;
    Ok((protos, services))
}

fn import_kind(
    registry: &ModuleRegistry,
    kind: ModuleKind,
    proto_path: &Path,
    include_paths: &[PathBuf],
) -> Result<ModuleHandle, LoadError> {
    let name = kind.translator().path_to_name(proto_path)?;
    registry.with_search_roots(include_paths, |registry| registry.import_module(name.as_str()))
}
