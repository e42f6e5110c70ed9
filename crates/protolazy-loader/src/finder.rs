//! # Schema Module Finder
//!
//! A [`ProtoFinder`] recognises logical names of one [`ModuleKind`] and
//! locates the schema file behind them. It never compiles: the only I/O is
//! a stat per search root. Names it cannot translate, and names whose
//! schema is under no root, fall through to the next finder.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use protolazy_core::{LogicalModuleName, ModuleKind, NameTranslator};

use crate::cache::CompilationCache;
use crate::compiler::Compiler;
use crate::host::{Finder, ModuleSpec};
use crate::loader::ProtoLoader;
use crate::search;

/// A located schema awaiting its load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    /// Kind of module being loaded.
    pub kind: ModuleKind,
    /// Logical name being loaded.
    pub name: LogicalModuleName,
    /// Schema path relative to `search_root`.
    pub source_path: PathBuf,
    /// Root under which the schema was found.
    pub search_root: PathBuf,
}

impl PendingLoad {
    /// Absolute (or root-relative) location of the schema file.
    pub fn origin(&self) -> PathBuf {
        self.search_root.join(&self.source_path)
    }
}

/// Finder for one module kind, backed by that kind's compiler.
#[derive(Clone)]
pub struct ProtoFinder {
    kind: ModuleKind,
    translator: NameTranslator,
    compiler: Arc<dyn Compiler>,
    cache: Arc<CompilationCache>,
}

impl fmt::Debug for ProtoFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtoFinder")
            .field("kind", &self.kind)
            .field("suffix", &self.translator.suffix())
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl ProtoFinder {
    /// Create a finder for `kind` sharing `cache` with its sibling finder.
    pub fn new(kind: ModuleKind, compiler: Arc<dyn Compiler>, cache: Arc<CompilationCache>) -> Self {
        Self {
            kind,
            translator: kind.translator(),
            compiler,
            cache,
        }
    }

    /// The kind of module this finder recognises.
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Locate the schema for `name` under `roots`.
    pub fn find(&self, name: &str, roots: &[PathBuf]) -> Option<PendingLoad> {
        let source_path = match self.translator.name_to_path(name) {
            Ok(path) => path,
            Err(e) => {
                tracing::trace!(module = name, kind = %self.kind, reason = %e, "not a schema module name");
                return None;
            }
        };
        let name = LogicalModuleName::new(name).ok()?;

        let Some(root) = search::resolve(roots, &source_path) else {
            tracing::debug!(
                module = %name,
                source = %source_path.display(),
                roots = roots.len(),
                "schema not found under any root"
            );
            return None;
        };

        tracing::debug!(module = %name, root = %root.display(), "schema located");
        Some(PendingLoad {
            kind: self.kind,
            name,
            search_root: root.to_path_buf(),
            source_path,
        })
    }

    /// Expected schema path for `name`, if this finder recognises it.
    pub fn source_path(&self, name: &str) -> Option<PathBuf> {
        self.translator.name_to_path(name).ok()
    }

    /// Returns true if `name` is a well-formed name of this finder's kind.
    pub fn recognises(&self, name: &str) -> bool {
        self.source_path(name).is_some()
    }
}

impl Finder for ProtoFinder {
    fn find_spec(&self, name: &str, roots: &[PathBuf]) -> Option<ModuleSpec> {
        let pending = self.find(name, roots)?;
        Some(ModuleSpec {
            name: pending.name.clone(),
            origin: Some(pending.origin()),
            loader: Box::new(ProtoLoader::new(
                pending,
                Arc::clone(&self.compiler),
                Arc::clone(&self.cache),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileFailure;
    use protolazy_core::GeneratedUnit;
    use std::fs;
    use std::path::Path;

    fn never_compiles() -> Arc<dyn Compiler> {
        Arc::new(|_: &Path, _: &[PathBuf]| -> Result<Vec<GeneratedUnit>, CompileFailure> {
            panic!("finder must not compile")
        })
    }

    fn finder(kind: ModuleKind) -> ProtoFinder {
        ProtoFinder::new(kind, never_compiles(), CompilationCache::shared())
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "syntax = \"proto3\";\n").unwrap();
    }

    #[test]
    fn finds_under_second_root() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(b.path(), "a/b/Msg.proto");
        let roots = vec![a.path().to_path_buf(), b.path().to_path_buf()];

        let pending = finder(ModuleKind::Messages).find("a.b.Msg_pb2", &roots).unwrap();
        assert_eq!(pending.kind, ModuleKind::Messages);
        assert_eq!(pending.name, "a.b.Msg_pb2");
        assert_eq!(pending.source_path, Path::new("a").join("b").join("Msg.proto"));
        assert_eq!(pending.search_root, b.path());
        assert_eq!(pending.origin(), b.path().join("a/b/Msg.proto"));
    }

    #[test]
    fn absent_schema_is_none() {
        let a = tempfile::tempdir().unwrap();
        let roots = vec![a.path().to_path_buf()];
        assert!(finder(ModuleKind::Messages).find("Missing_pb2", &roots).is_none());
    }

    #[test]
    fn other_kinds_fall_through() {
        let a = tempfile::tempdir().unwrap();
        touch(a.path(), "Echo.proto");
        let roots = vec![a.path().to_path_buf()];

        let messages = finder(ModuleKind::Messages);
        let services = finder(ModuleKind::Services);
        assert!(messages.find("Echo_pb2_grpc", &roots).is_none());
        assert!(services.find("Echo_pb2", &roots).is_none());
        assert!(services.find("Echo_pb2_grpc", &roots).is_some());
        assert!(messages.find("json", &roots).is_none());
        assert!(!messages.recognises("json"));
    }

    #[test]
    fn names_with_path_separators_never_leave_the_roots() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        touch(outside.path(), "Evil.proto");
        let roots = vec![root.path().to_path_buf()];

        let name = format!("{}_pb2", outside.path().join("Evil").display());
        let messages = finder(ModuleKind::Messages);
        assert!(!messages.recognises(&name));
        assert!(messages.find(&name, &roots).is_none());
    }

    #[test]
    fn find_spec_names_the_origin() {
        let a = tempfile::tempdir().unwrap();
        touch(a.path(), "Echo.proto");
        let roots = vec![a.path().to_path_buf()];
        let spec = finder(ModuleKind::Services).find_spec("Echo_pb2_grpc", &roots).unwrap();
        assert_eq!(spec.name, "Echo_pb2_grpc");
        assert_eq!(spec.origin.as_deref(), Some(a.path().join("Echo.proto").as_path()));
    }
}
