//! # protolazy CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use protolazy_cli::compile::{run_compile, CompileArgs};
use protolazy_cli::load::{run_load, LoadArgs};
use protolazy_cli::load_config;

/// Lazy, cached loading of compiler-generated schema modules.
#[derive(Parser, Debug)]
#[command(name = "protolazy", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Schema compiler executable. Overrides configuration and environment.
    #[arg(long, global = true, value_name = "PROGRAM")]
    protoc: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the schema compiler with the given arguments.
    Compile(CompileArgs),

    /// Load a schema module and print its namespace as JSON.
    Load(LoadArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref(), cli.protoc.as_deref()).and_then(|config| {
        tracing::debug!(
            roots = ?config.search_roots,
            program = %config.compiler.program,
            "configuration resolved"
        );
        match &cli.command {
            Commands::Compile(args) => run_compile(args, &config),
            Commands::Load(args) => run_load(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
