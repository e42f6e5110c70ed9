//! # Search Roots
//!
//! Ordered list of directories consulted to locate a schema file, and the
//! first-match resolver over it.
//!
//! ## Scoped Augmentation
//!
//! [`SearchRoots::augment`] appends extra roots for the lifetime of the
//! returned [`AugmentGuard`]. Dropping the guard restores the exact list
//! that was in place before, on every exit path including early returns
//! and unwinding.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

/// Find the first root under which `relative` exists.
///
/// Only stats the candidate paths. Missing roots and stat failures count as
/// "not here" rather than errors.
pub fn resolve<'a>(roots: &'a [PathBuf], relative: &Path) -> Option<&'a Path> {
    for root in roots {
        let candidate = root.join(relative);
        if candidate.exists() {
            tracing::trace!(candidate = %candidate.display(), "schema found");
            return Some(root.as_path());
        }
        tracing::trace!(candidate = %candidate.display(), "schema not under root");
    }
    None
}

/// Shared, ordered list of search roots.
///
/// Cloning yields another handle to the same list.
#[derive(Debug, Clone, Default)]
pub struct SearchRoots {
    roots: Arc<RwLock<Vec<PathBuf>>>,
}

impl SearchRoots {
    /// Create a root list from an ordered sequence of directories.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: Arc::new(RwLock::new(roots.into_iter().map(Into::into).collect())),
        }
    }

    /// Copy of the current roots, in priority order.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.roots.read().clone()
    }

    /// Append a root with the lowest priority.
    pub fn push(&self, root: impl Into<PathBuf>) {
        self.roots.write().push(root.into());
    }

    /// Returns the number of roots.
    pub fn len(&self) -> usize {
        self.roots.read().len()
    }

    /// Returns true if there are no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.read().is_empty()
    }

    /// Resolve `relative` against the current roots.
    pub fn resolve(&self, relative: &Path) -> Option<PathBuf> {
        let roots = self.roots.read();
        resolve(&roots, relative).map(Path::to_path_buf)
    }

    /// Append `extra` until the returned guard is dropped.
    pub fn augment(&self, extra: &[PathBuf]) -> AugmentGuard {
        let mut roots = self.roots.write();
        let original = roots.clone();
        roots.extend(extra.iter().cloned());
        tracing::trace!(added = extra.len(), total = roots.len(), "search roots augmented");
        AugmentGuard {
            roots: Arc::clone(&self.roots),
            original: Some(original),
        }
    }
}

/// Restores a [`SearchRoots`] list to its pre-augmentation state on drop.
#[must_use = "the augmentation is reverted as soon as the guard is dropped"]
#[derive(Debug)]
pub struct AugmentGuard {
    roots: Arc<RwLock<Vec<PathBuf>>>,
    original: Option<Vec<PathBuf>>,
}

impl Drop for AugmentGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            *self.roots.write() = original;
        }
    }
}
