//! # External Compiler Contract
//!
//! The schema compiler is opaque to protolazy. It is a function from a
//! relative schema path plus the current search roots to an ordered list of
//! [`GeneratedUnit`]s: dependencies first, the requested target last.
//!
//! [`CommandCompiler`] adapts an executable to that contract. It runs
//!
//! ```text
//! <program> [args...] --proto_path=<root>... --bindings_out=<kind> <source>
//! ```
//!
//! and decodes a JSON array of units from stdout. A non-zero exit status is
//! a compilation failure whose diagnostics are the process's stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use protolazy_core::{CompilerConfig, GeneratedUnit, ModuleKind};
use thiserror::Error;

/// The compiler rejected a schema, or could not be run at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{diagnostics}")]
pub struct CompileFailure {
    /// Diagnostic text, passed through to the caller verbatim.
    pub diagnostics: String,
}

impl CompileFailure {
    /// Create a failure carrying the given diagnostics.
    pub fn new(diagnostics: impl Into<String>) -> Self {
        Self {
            diagnostics: diagnostics.into(),
        }
    }
}

/// Produces generated code for a schema file.
pub trait Compiler: Send + Sync {
    /// Compile `source` (relative to one of `roots`).
    ///
    /// On success the last unit is the target and every preceding unit is a
    /// transitive dependency, each appearing before anything that depends
    /// on it.
    fn compile(&self, source: &Path, roots: &[PathBuf]) -> Result<Vec<GeneratedUnit>, CompileFailure>;
}

impl<F> Compiler for F
where
    F: Fn(&Path, &[PathBuf]) -> Result<Vec<GeneratedUnit>, CompileFailure> + Send + Sync,
{
    fn compile(&self, source: &Path, roots: &[PathBuf]) -> Result<Vec<GeneratedUnit>, CompileFailure> {
        self(source, roots)
    }
}

/// A [`Compiler`] backed by an external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    kind: ModuleKind,
}

impl CommandCompiler {
    /// Run `program` to produce modules of the given kind.
    pub fn new(program: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            kind,
        }
    }

    /// Build a compiler from configuration.
    pub fn from_config(config: &CompilerConfig, kind: ModuleKind) -> Self {
        Self::new(config.program.clone(), kind).with_args(config.args.iter().cloned())
    }

    /// Arguments placed before the ones the adapter adds.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The executable this adapter runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The kind of module this adapter asks the compiler for.
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// The full argument list for compiling `source` against `roots`.
    ///
    /// # Errors
    ///
    /// Paths must be valid UTF-8; anything else is reported as a
    /// compilation failure before the process is spawned.
    pub fn command_line(&self, source: &Path, roots: &[PathBuf]) -> Result<Vec<String>, CompileFailure> {
        let mut line = self.args.clone();
        for root in roots {
            line.push(format!("--proto_path={}", utf8(root)?));
        }
        line.push(format!("--bindings_out={}", self.kind));
        line.push(utf8(source)?.to_string());
        Ok(line)
    }

    /// Run the compiler with raw command-line arguments, inheriting stdio.
    ///
    /// Returns the process exit code. A process killed by a signal reports 1.
    pub fn run_main(&self, args: &[String]) -> std::io::Result<i32> {
        tracing::debug!(program = %self.program, ?args, "running compiler");
        let status = Command::new(&self.program).args(&self.args).args(args).status()?;
        Ok(status.code().unwrap_or_else(|| {
            tracing::warn!(program = %self.program, "compiler terminated by signal");
            1
        }))
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, source: &Path, roots: &[PathBuf]) -> Result<Vec<GeneratedUnit>, CompileFailure> {
        let line = self.command_line(source, roots)?;
        tracing::debug!(program = %self.program, args = ?line, "invoking compiler");

        let output = Command::new(&self.program)
            .args(&line)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| CompileFailure::new(format!("failed to run '{}': {e}", self.program)))?;

        if !output.status.success() {
            return Err(CompileFailure::new(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            CompileFailure::new(format!(
                "'{}' produced unreadable output for {}: {e}",
                self.program,
                source.display()
            ))
        })
    }
}

fn utf8(path: &Path) -> Result<&str, CompileFailure> {
    path.to_str()
        .ok_or_else(|| CompileFailure::new(format!("path is not valid UTF-8: {}", path.display())))
}
