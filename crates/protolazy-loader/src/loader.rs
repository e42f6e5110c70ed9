//! # Schema Module Loader
//!
//! Populates one module from its schema, compiling only on a cache miss.
//!
//! ## Protocol
//!
//! 1. The host-created module must carry the name that was found.
//! 2. Cache hit: install the cached code. No compiler call, no dependency
//!    walk.
//! 3. Cache miss: compile the schema against the host's current roots.
//! 4. For each dependency unit the host has not registered yet, cache its
//!    code and import it through the host. That import re-enters the finder
//!    chain and is served from the cache by step 2.
//! 5. Install the target's code.
//!
//! The target's own code is never cached; a failed compilation leaves no
//! trace, so a retry compiles again.

use std::sync::Arc;

use protolazy_core::{LoadError, NameTranslator};

use crate::cache::CompilationCache;
use crate::compiler::Compiler;
use crate::finder::PendingLoad;
use crate::host::{Loader, ModuleHost};
use crate::namespace::ModuleHandle;

/// Loader for a single located schema module.
pub struct ProtoLoader {
    pending: PendingLoad,
    compiler: Arc<dyn Compiler>,
    cache: Arc<CompilationCache>,
}

impl ProtoLoader {
    /// Create a loader that consumes `pending`.
    pub fn new(pending: PendingLoad, compiler: Arc<dyn Compiler>, cache: Arc<CompilationCache>) -> Self {
        Self {
            pending,
            compiler,
            cache,
        }
    }

    /// The load this loader will perform.
    pub fn pending(&self) -> &PendingLoad {
        &self.pending
    }
}

impl Loader for ProtoLoader {
    fn exec_module(self: Box<Self>, module: &ModuleHandle, host: &dyn ModuleHost) -> Result<(), LoadError> {
        let pending = &self.pending;
        if *module.name() != pending.name {
            return Err(LoadError::Integrity(format!(
                "loader for '{}' was handed module '{}'",
                pending.name,
                module.name()
            )));
        }

        if let Some(code) = self.cache.get(pending.name.as_str()) {
            tracing::debug!(module = %pending.name, "installing cached code");
            return module.install(&code, host);
        }

        tracing::info!(
            module = %pending.name,
            kind = %pending.kind,
            source = %pending.source_path.display(),
            "compiling schema"
        );
        let mut units = self
            .compiler
            .compile(&pending.source_path, &host.search_roots())
            .map_err(|failure| {
                tracing::warn!(module = %pending.name, "schema compilation failed");
                LoadError::Compilation {
                    name: pending.name.to_string(),
                    source_path: pending.source_path.clone(),
                    diagnostics: failure.diagnostics,
                }
            })?;

        let target = units.pop().ok_or_else(|| {
            LoadError::Integrity(format!(
                "compiler produced no output for '{}'",
                pending.source_path.display()
            ))
        })?;

        for unit in units {
            let dependency = NameTranslator::generated_file_to_name(&unit.path)?;
            if host.is_registered(dependency.as_str()) {
                tracing::trace!(module = %pending.name, dependency = %dependency, "dependency already loaded");
                continue;
            }
            self.cache.insert_if_absent(dependency.clone(), unit.code);
            tracing::debug!(module = %pending.name, dependency = %dependency, "importing dependency");
            host.import_module(dependency.as_str())?;
        }

        module.install(&target.code, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileFailure;
    use crate::host::ModuleRegistry;
    use protolazy_core::{BindingValue, GeneratedCode, GeneratedUnit, LogicalModuleName, ModuleKind};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pending(name: &str, source: &str) -> PendingLoad {
        PendingLoad {
            kind: ModuleKind::Messages,
            name: LogicalModuleName::new(name).unwrap(),
            source_path: PathBuf::from(source),
            search_root: PathBuf::from("/root"),
        }
    }

    fn loader(p: PendingLoad, compiler: Arc<dyn Compiler>, cache: Arc<CompilationCache>) -> Box<ProtoLoader> {
        Box::new(ProtoLoader::new(p, compiler, cache))
    }

    fn counting(
        units: Vec<GeneratedUnit>,
    ) -> (Arc<dyn Compiler>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let compiler = move |_: &Path, _: &[PathBuf]| -> Result<Vec<GeneratedUnit>, CompileFailure> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(units.clone())
        };
        (Arc::new(compiler), calls)
    }

    fn code(full_name: &str) -> GeneratedCode {
        GeneratedCode::default().with(
            full_name.rsplit('.').next().unwrap(),
            BindingValue::Type {
                full_name: full_name.to_string(),
            },
        )
    }

    #[test]
    fn name_mismatch_is_an_integrity_error() {
        let host = ModuleRegistry::new();
        let (compiler, calls) = counting(vec![]);
        let module = host.create_empty_module(LogicalModuleName::new("b_pb2").unwrap(), None);
        let err = loader(pending("a_pb2", "a.proto"), compiler, CompilationCache::shared())
            .exec_module(&module, &host)
            .unwrap_err();
        assert!(matches!(err, LoadError::Integrity(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cache_hit_skips_the_compiler() {
        let host = ModuleRegistry::new();
        let cache = CompilationCache::shared();
        cache.insert_if_absent(LogicalModuleName::new("a_pb2").unwrap(), code("a.A"));
        let (compiler, calls) = counting(vec![]);

        let module = host.create_empty_module(LogicalModuleName::new("a_pb2").unwrap(), None);
        loader(pending("a_pb2", "a.proto"), compiler, cache)
            .exec_module(&module, &host)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(module.get("A").is_some());
    }

    #[test]
    fn empty_compiler_output_is_an_integrity_error() {
        let host = ModuleRegistry::new();
        let (compiler, _) = counting(vec![]);
        let module = host.create_empty_module(LogicalModuleName::new("a_pb2").unwrap(), None);
        let err = loader(pending("a_pb2", "a.proto"), compiler, CompilationCache::shared())
            .exec_module(&module, &host)
            .unwrap_err();
        assert!(matches!(err, LoadError::Integrity(msg) if msg.contains("no output")));
    }

    #[test]
    fn compile_failure_keeps_diagnostics_and_caches_nothing() {
        let host = ModuleRegistry::new();
        let cache = CompilationCache::shared();
        let compiler: Arc<dyn Compiler> = Arc::new(
            |_: &Path, _: &[PathBuf]| -> Result<Vec<GeneratedUnit>, CompileFailure> {
                Err(CompileFailure::new("a.proto:1:1: syntax error"))
            },
        );
        let module = host.create_empty_module(LogicalModuleName::new("a_pb2").unwrap(), None);
        let err = loader(pending("a_pb2", "a.proto"), compiler, Arc::clone(&cache))
            .exec_module(&module, &host)
            .unwrap_err();
        match err {
            LoadError::Compilation {
                name,
                source_path,
                diagnostics,
            } => {
                assert_eq!(name, "a_pb2");
                assert_eq!(source_path, Path::new("a.proto"));
                assert_eq!(diagnostics, "a.proto:1:1: syntax error");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(cache.is_empty());
        assert!(!module.is_populated());
    }

    #[test]
    fn registered_dependencies_are_not_recached() {
        let host = ModuleRegistry::new();
        let dep = host.create_empty_module(LogicalModuleName::new("Dep_pb2").unwrap(), None);
        dep.install(&code("Dep"), &host).unwrap();
        host.register_module(dep);

        let cache = CompilationCache::shared();
        let (compiler, _) = counting(vec![
            GeneratedUnit::new("Dep_pb2.py", code("Other")),
            GeneratedUnit::new("Msg_pb2.py", code("Msg")),
        ]);
        let module = host.create_empty_module(LogicalModuleName::new("Msg_pb2").unwrap(), None);
        loader(pending("Msg_pb2", "Msg.proto"), compiler, Arc::clone(&cache))
            .exec_module(&module, &host)
            .unwrap();

        assert!(cache.is_empty());
        assert!(host.lookup("Dep_pb2").unwrap().get("Dep").is_some());
        assert!(module.get("Msg").is_some());
    }

    #[test]
    fn malformed_generated_path_is_a_name_error() {
        let host = ModuleRegistry::new();
        let (compiler, _) = counting(vec![
            GeneratedUnit::new("a//Dep_pb2.py", GeneratedCode::default()),
            GeneratedUnit::new("Msg_pb2.py", GeneratedCode::default()),
        ]);
        let module = host.create_empty_module(LogicalModuleName::new("Msg_pb2").unwrap(), None);
        let err = loader(pending("Msg_pb2", "Msg.proto"), compiler, CompilationCache::shared())
            .exec_module(&module, &host)
            .unwrap_err();
        assert!(matches!(err, LoadError::Name(_)));
    }
}
