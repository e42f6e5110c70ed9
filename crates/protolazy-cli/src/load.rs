//! # Load CLI — Load a schema module and print its namespace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use protolazy_core::{LoaderConfig, LogicalModuleName};
use protolazy_loader::{get_protos, get_services, registry_from_config, Namespace};
use serde::Serialize;

/// Load subcommand arguments.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Schema file, relative to a search root (e.g. `a/b/Msg.proto`).
    pub proto: PathBuf,

    /// Extra search root for this load. Repeatable.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Load the services module instead of the messages module.
    #[arg(long)]
    pub services: bool,
}

/// What `protolazy load` prints.
#[derive(Debug, Serialize)]
pub struct LoadReport {
    /// Logical name of the loaded module.
    pub module: LogicalModuleName,
    /// Schema file the module was loaded from.
    pub origin: Option<PathBuf>,
    /// Modules loaded by this invocation, dependencies first.
    pub load_order: Vec<LogicalModuleName>,
    /// The module's bindings.
    pub namespace: Namespace,
}

/// Execute the load subcommand.
pub fn run_load(args: &LoadArgs, config: &LoaderConfig) -> Result<u8> {
    let report = load_report(args, config)?;
    let json = serde_json::to_string_pretty(&report).context("serializing load report")?;
    println!("{json}");
    Ok(0)
}

/// Load the requested module and describe it.
pub fn load_report(args: &LoadArgs, config: &LoaderConfig) -> Result<LoadReport> {
    let registry = registry_from_config(config);
    let mut include = args.include.clone();
    include.extend(config.bundled_include.iter().cloned());

    let module = if args.services {
        get_services(&registry, &args.proto, &include)
    } else {
        get_protos(&registry, &args.proto, &include)
    }
    .with_context(|| format!("loading {}", args.proto.display()))?;

    Ok(LoadReport {
        module: module.name().clone(),
        origin: module.origin().map(PathBuf::from),
        load_order: registry.load_order(),
        namespace: module.namespace(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_schema_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig {
            search_roots: vec![dir.path().to_path_buf()],
            ..LoaderConfig::default()
        };
        let args = LoadArgs {
            proto: PathBuf::from("a/Missing.proto"),
            include: vec![],
            services: false,
        };
        let err = load_report(&args, &config).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("a/Missing.proto"));
        assert!(msg.contains("a.Missing_pb2"));
    }
}
