//! Process-backed `ToolRunner`.
use super::{format_command_line, Deadline, InvokeOptions, OutputMode, ToolOutput, ToolRunner};
use crate::error::{ProvisionError, ProvisionResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Spawns the external tool inside the workspace directory.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    prefix_args: Vec<String>,
    display_name: String,
    cwd: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    /// Build a runner from a tool command line such as `stepzen` or
    /// `npx stepzen`. The program is resolved on PATH up front.
    pub fn new(command_line: &str, cwd: &Path, timeout: Duration) -> ProvisionResult<Self> {
        let words = shell_words::split(command_line).map_err(|err| {
            ProvisionError::InvalidConfig(format!("parse tool command {command_line:?}: {err}"))
        })?;
        let Some((program, prefix_args)) = words.split_first() else {
            return Err(ProvisionError::InvalidConfig(
                "tool command is empty".to_string(),
            ));
        };
        let resolved = which::which(program).map_err(|_| ProvisionError::ToolNotFound {
            program: program.clone(),
        })?;
        Ok(Self {
            program: resolved,
            prefix_args: prefix_args.to_vec(),
            display_name: program.clone(),
            cwd: cwd.to_path_buf(),
            timeout,
        })
    }

    fn command_line(&self, argv: &[String]) -> String {
        let mut full = Vec::with_capacity(self.prefix_args.len() + argv.len() + 1);
        full.push(self.display_name.clone());
        full.extend(self.prefix_args.iter().cloned());
        full.extend(argv.iter().cloned());
        format_command_line(&full)
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, argv: &[String], options: InvokeOptions) -> ProvisionResult<ToolOutput> {
        let command_line = self.command_line(argv);
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix_args)
            .args(argv)
            .current_dir(&self.cwd)
            .stdin(Stdio::null());
        if options.output == OutputMode::Capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        tracing::debug!(command = %command_line, cwd = %self.cwd.display(), "spawn tool");
        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|err| ProvisionError::fs(format!("spawn {command_line}"), err))?;
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let deadline = match options.deadline {
            Deadline::Configured => Some(start + self.timeout),
            Deadline::Unbounded => None,
        };
        let status = wait_with_deadline(&mut child, deadline, &command_line)?;
        // A background process can keep the pipes open after the child exits.
        let output = status.and_then(|status| {
            let stdout = collect_reader(stdout_reader, deadline)?;
            let stderr = collect_reader(stderr_reader, deadline)?;
            Some((status, stdout, stderr))
        });
        let elapsed_ms = start.elapsed().as_millis();

        let Some((status, stdout, stderr)) = output else {
            tracing::warn!(elapsed_ms, command = %command_line, "tool invoke timed out");
            return Err(ProvisionError::ExternalCommandTimedOut {
                command: command_line,
                timeout_secs: self.timeout.as_secs(),
            });
        };

        tracing::info!(
            elapsed_ms,
            command = %command_line,
            exit_code = ?status.code(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "tool invoke complete"
        );
        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code: status.code(),
        })
    }
}

/// Poll the child until it exits or the deadline passes.
///
/// Returns `None` after killing a child that overran its deadline.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
    command_line: &str,
) -> ProvisionResult<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        let status = child
            .wait()
            .map_err(|err| ProvisionError::fs(format!("wait for {command_line}"), err))?;
        return Ok(Some(status));
    };
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|err| ProvisionError::fs(format!("check {command_line}"), err))?
        {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Wait for a reader to reach end of stream, up to `deadline`.
///
/// Returns `None` when the stream is still open at the deadline; the reader
/// thread is abandoned.
fn collect_reader(
    reader: Option<Receiver<Vec<u8>>>,
    deadline: Option<Instant>,
) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };
    let bytes = match deadline {
        Some(deadline) => {
            match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok(bytes) => bytes,
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => Vec::new(),
            }
        }
        None => reader.recv().unwrap_or_default(),
    };
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(all(test, unix))]
#[path = "process_tests.rs"]
mod tests;
