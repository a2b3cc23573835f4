//! Thin wrappers around external processes.
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Run a command, allowing failure (returns result without bailing).
///
/// # Errors
///
/// Returns an error only if the process cannot be spawned.
pub fn run_unchecked<I, S>(program: &str, args: I) -> Result<ExecResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute: {program}"))?;

    Ok(ExecResult::from(output))
}

/// Check if a program is available on PATH.
#[must_use]
pub fn which(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Render a coloured unified diff of two files with the system `diff`.
///
/// Returns `Ok(None)` when `diff` is not installed. `diff` exits 1 when the
/// files differ, so only exit codes above 1 are treated as failures.
///
/// # Errors
///
/// Returns an error if `diff` cannot be run or reports trouble.
pub fn diff_files(old: &Path, new: &Path) -> Result<Option<String>> {
    if !which("diff") {
        return Ok(None);
    }
    let result = run_unchecked(
        "diff",
        [
            OsStr::new("--color=always"),
            OsStr::new("-u"),
            old.as_os_str(),
            new.as_os_str(),
        ],
    )?;
    match result.code {
        Some(0 | 1) => Ok(Some(result.stdout)),
        code => anyhow::bail!(
            "diff failed (exit {}): {}",
            code.unwrap_or(-1),
            result.stderr.trim()
        ),
    }
}
