//! # Loader Configuration
//!
//! Search roots, the external compiler command, and the bundled include
//! directory, loadable from YAML and overridable from the environment.
//!
//! ```yaml
//! search_roots:
//!   - protos
//!   - third_party/protos
//! compiler:
//!   program: protoc-bindings
//!   args: ["--experimental_allow_proto3_optional"]
//! bundled_include: /usr/share/protolazy/include
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding extra search roots (platform path-list syntax).
pub const ENV_SEARCH_PATH: &str = "PROTOLAZY_PATH";

/// Environment variable naming the compiler executable.
pub const ENV_COMPILER: &str = "PROTOLAZY_PROTOC";

/// Environment variable naming the bundled include directory.
pub const ENV_BUNDLED_INCLUDE: &str = "PROTOLAZY_INCLUDE";

/// Default compiler executable.
pub const DEFAULT_COMPILER_PROGRAM: &str = "protoc";

/// Top-level loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Ordered search roots; the first root containing a schema wins.
    pub search_roots: Vec<PathBuf>,
    /// External compiler command.
    pub compiler: CompilerConfig,
    /// Directory of schema files shipped with the tool (well-known types).
    pub bundled_include: Option<PathBuf>,
}

/// How to invoke the external compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Executable name or path.
    pub program: String,
    /// Arguments placed before the ones protolazy adds.
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMPILER_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

impl LoaderConfig {
    /// Parse a configuration from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML configuration file.
    ///
    /// Relative search roots and include directories are resolved against
    /// the directory containing the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Apply `PROTOLAZY_PATH`, `PROTOLAZY_PROTOC` and `PROTOLAZY_INCLUDE`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var_os(key))
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Roots from the search-path variable are appended after the configured
    /// ones; the compiler program and include directory are replaced.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<std::ffi::OsString>,
    {
        if let Some(paths) = lookup(ENV_SEARCH_PATH) {
            self.search_roots.extend(
                std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()),
            );
        }
        if let Some(program) = lookup(ENV_COMPILER).and_then(|p| p.into_string().ok()) {
            if !program.is_empty() {
                self.compiler.program = program;
            }
        }
        if let Some(include) = lookup(ENV_BUNDLED_INCLUDE) {
            if !include.is_empty() {
                self.bundled_include = Some(PathBuf::from(include));
            }
        }
        self
    }

    fn rebase(&mut self, base: &Path) {
        for root in &mut self.search_roots {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
        if let Some(include) = &mut self.bundled_include {
            if include.is_relative() {
                *include = base.join(&*include);
            }
        }
    }
}
