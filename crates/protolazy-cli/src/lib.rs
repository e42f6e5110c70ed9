//! # protolazy-cli — Command-Line Front End
//!
//! Provides the `protolazy` binary.
//!
//! ## Subcommands
//!
//! - `protolazy compile` — run the schema compiler with the given arguments
//!   plus the bundled include directory; exits with the compiler's status.
//! - `protolazy load` — load a schema module through the full lazy-load
//!   protocol and print its namespace as JSON.
//!
//! ```bash
//! protolazy compile --proto_path=protos --bindings_out=messages a/b/Msg.proto
//! protolazy load a/b/Msg.proto -I third_party --services
//! ```

pub mod compile;
pub mod load;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use protolazy_core::LoaderConfig;

/// Name of the include directory looked for next to the executable.
pub const BUNDLED_INCLUDE_DIR: &str = "include";

/// Build the effective configuration for one CLI invocation.
///
/// Precedence, lowest first: defaults, the `--config` file, environment
/// variables, then `--protoc`. With no roots configured, the current
/// directory is searched.
pub fn load_config(path: Option<&Path>, protoc: Option<&str>) -> Result<LoaderConfig> {
    let config = match path {
        Some(path) => LoaderConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LoaderConfig::default(),
    };
    Ok(finish_config(config.with_env_overrides(), protoc))
}

fn finish_config(mut config: LoaderConfig, protoc: Option<&str>) -> LoaderConfig {
    if let Some(program) = protoc {
        config.compiler.program = program.to_string();
    }
    if config.search_roots.is_empty() {
        config.search_roots.push(PathBuf::from("."));
    }
    if config.bundled_include.is_none() {
        config.bundled_include = default_bundled_include();
    }
    config
}

/// `include/` next to the running executable, if that directory exists.
pub fn default_bundled_include() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join(BUNDLED_INCLUDE_DIR);
    dir.is_dir().then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protoc_flag_overrides_program() {
        let config = finish_config(LoaderConfig::default(), Some("my-protoc"));
        assert_eq!(config.compiler.program, "my-protoc");
    }

    #[test]
    fn empty_roots_default_to_current_directory() {
        let config = finish_config(LoaderConfig::default(), None);
        assert_eq!(config.search_roots, vec![PathBuf::from(".")]);
    }

    #[test]
    fn configured_values_are_kept() {
        let config = LoaderConfig {
            search_roots: vec![PathBuf::from("/protos")],
            bundled_include: Some(PathBuf::from("/inc")),
            ..LoaderConfig::default()
        };
        let config = finish_config(config, None);
        assert_eq!(config.search_roots, vec![PathBuf::from("/protos")]);
        assert_eq!(config.bundled_include, Some(PathBuf::from("/inc")));
        assert_eq!(config.compiler.program, "protoc");
    }

    #[test]
    fn config_file_is_read_and_rebased() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protolazy.yaml");
        std::fs::write(&path, "search_roots: [protos]\nbundled_include: inc\n").unwrap();
        let config = load_config(Some(&path), Some("protoc-x")).unwrap();
        assert!(config.search_roots.contains(&dir.path().join("protos")));
        assert_eq!(config.bundled_include, Some(dir.path().join("inc")));
        assert_eq!(config.compiler.program, "protoc-x");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config(Some(Path::new("/no/such/protolazy.yaml")), None).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/protolazy.yaml"));
    }
}
