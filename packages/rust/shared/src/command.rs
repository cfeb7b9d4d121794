//! External command capability.
//!
//! All subprocess work (git, the container runtime, the ingestion CLI) goes
//! through [`CommandRunner`], so pipeline logic stays testable with a fake
//! implementation that never touches a network or container runtime.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{DocforgeError, Result};

/// Captured outcome of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful output with empty streams, handy for fakes.
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// A failed output carrying the given stderr, handy for fakes.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Run a named program with arguments against a working directory.
///
/// Implementations return `Err` only when the program could not be started;
/// a started program that exits non-zero is reported through
/// [`CommandOutput::success`] so callers can decide per-stage whether the
/// failure is fatal.
pub trait CommandRunner {
    /// Execute `program` with `args`, optionally in `cwd`, waiting for exit.
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput>;

    /// Check whether a program can be started at all (`<program> --version`).
    fn is_available(&self, program: &str) -> bool {
        self.run(program, &["--version"], None)
            .map(|out| out.success)
            .unwrap_or(false)
    }
}

/// The real implementation backed by `std::process::Command`.
///
/// Waits are synchronous and unbounded; a hung external process hangs the
/// whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(program, ?args, cwd = ?cwd.map(Path::to_path_buf), "running command");

        let output = cmd.output().map_err(|e| {
            DocforgeError::Command(format!("failed to start '{program}': {e}"))
        })?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success {
            tracing::debug!(
                program,
                code = ?result.code,
                stderr = %truncate(&result.stderr, 500),
                "command exited non-zero"
            );
        }

        Ok(result)
    }
}

/// A recorded invocation, used by test fakes to assert call sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
