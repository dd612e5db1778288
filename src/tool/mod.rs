//! Boundary for every external tool invocation.
//!
//! The pipeline never spawns processes directly: each call goes through a
//! `ToolRunner`, and the helpers here turn raw exit statuses into the error
//! taxonomy (checked mode, import mode).
mod import;
mod process;

pub use import::{run_import, ImportSource, IMPORT_KIND_REST};
pub use process::ProcessRunner;

use crate::error::{ProvisionError, ProvisionResult};
use crate::util::truncate_string;

/// Maximum stderr bytes carried into error values.
const MAX_ERROR_STDERR_BYTES: usize = 4096;

/// Whether the child's output is captured or passed through to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Capture,
    Inherit,
}

/// Whether the runner's configured timeout applies to this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    Configured,
    Unbounded,
}

/// Per-call invocation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeOptions {
    pub output: OutputMode,
    pub deadline: Deadline,
}

impl InvokeOptions {
    /// Captured output under the configured timeout.
    pub const CAPTURED: Self = Self {
        output: OutputMode::Capture,
        deadline: Deadline::Configured,
    };

    /// Terminal passthrough with no timeout, for long-running commands.
    pub const FOREGROUND: Self = Self {
        output: OutputMode::Inherit,
        deadline: Deadline::Unbounded,
    };
}

/// Output of a finished external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes external tool subcommands.
///
/// Implementations return `Ok` for any process that ran to completion,
/// regardless of its exit code; spawn failures and timeouts are errors.
pub trait ToolRunner {
    /// Run the tool with `argv` (subcommand first, tool program excluded).
    fn run(&self, argv: &[String], options: InvokeOptions) -> ProvisionResult<ToolOutput>;
}

/// Run a subcommand in checked mode: any non-zero exit is fatal.
pub fn run_checked<S: AsRef<str>>(
    runner: &dyn ToolRunner,
    argv: &[S],
) -> ProvisionResult<ToolOutput> {
    run_checked_with(runner, argv, InvokeOptions::CAPTURED)
}

/// Checked mode with explicit invocation options.
pub fn run_checked_with<S: AsRef<str>>(
    runner: &dyn ToolRunner,
    argv: &[S],
    options: InvokeOptions,
) -> ProvisionResult<ToolOutput> {
    let argv = owned_argv(argv);
    let output = runner.run(&argv, options)?;
    if !output.success() {
        return Err(ProvisionError::ExternalCommandFailed {
            command: format_command_line(&argv),
            exit_code: output.exit_code,
            stderr: truncate_string(&output.stderr, MAX_ERROR_STDERR_BYTES),
        });
    }
    for line in output.stdout.lines().filter(|line| !line.trim().is_empty()) {
        tracing::debug!(command = %format_command_line(&argv), "{line}");
    }
    Ok(output)
}

fn owned_argv<S: AsRef<str>>(argv: &[S]) -> Vec<String> {
    argv.iter().map(|arg| arg.as_ref().to_string()).collect()
}

/// Render argv as a shell-safe command line for logs and errors.
///
/// Arguments made only of word characters and `-./:@+=` are left bare;
/// anything else is single-quoted.
pub fn format_command_line(argv: &[String]) -> String {
    let is_bare = |ch: char| ch.is_ascii_alphanumeric() || "_-./:@+=".contains(ch);
    let mut line = String::new();
    for (index, arg) in argv.iter().enumerate() {
        if index > 0 {
            line.push(' ');
        }
        if !arg.is_empty() && arg.chars().all(is_bare) {
            line.push_str(arg);
        } else {
            line.push('\'');
            line.push_str(&arg.replace('\'', r#"'\''"#));
            line.push('\'');
        }
    }
    line
}

#[cfg(test)]
pub(crate) mod testing;
