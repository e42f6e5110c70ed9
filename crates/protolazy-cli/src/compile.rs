//! # Compile CLI — Run the schema compiler directly.
//!
//! Every argument after `compile` is passed through untouched. The bundled
//! include directory is appended as a final `-I` so that well-known schemas
//! resolve without extra flags.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use protolazy_core::{LoaderConfig, ModuleKind};
use protolazy_loader::CommandCompiler;

/// Compile subcommand arguments.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Arguments forwarded to the compiler.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// The forwarded arguments with the bundled include flag appended.
pub fn compiler_arguments(args: &[String], bundled_include: Option<&Path>) -> Vec<String> {
    let mut forwarded = args.to_vec();
    if let Some(include) = bundled_include {
        forwarded.push(format!("-I{}", include.display()));
    }
    forwarded
}

/// Execute the compile subcommand. Returns the compiler's exit status.
pub fn run_compile(args: &CompileArgs, config: &LoaderConfig) -> Result<u8> {
    let forwarded = compiler_arguments(&args.args, config.bundled_include.as_deref());
    if config.bundled_include.is_none() {
        tracing::debug!("no bundled include directory configured");
    }

    let compiler = CommandCompiler::from_config(&config.compiler, ModuleKind::Messages);
    let status = compiler
        .run_main(&forwarded)
        .with_context(|| format!("running compiler '{}'", compiler.program()))?;
    Ok(u8::try_from(status).unwrap_or(1))
}
