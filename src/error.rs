//! Error taxonomy for the provisioning pipeline.
//!
//! Every failure aborts the run; `StepError` attaches the name of the step
//! that produced it so the caller can report where provisioning stopped.
use crate::workflow::Step;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors raised by artifact synthesis, workspace inspection, and tool calls.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The user-supplied base schema fragment does not exist.
    #[error("base schema fragment not found at {}", .path.display())]
    MissingBaseFragment { path: PathBuf },

    /// The generated schema is missing where it must be mirrored from.
    #[error("GraphQL schema not found at {}", .path.display())]
    SchemaNotFound { path: PathBuf },

    /// A checked external command exited non-zero.
    #[error("`{command}` failed with exit code {}{}", exit_code_label(.exit_code), stderr_suffix(.stderr))]
    ExternalCommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// An external command ran past its configured timeout and was killed.
    #[error("`{command}` timed out after {timeout_secs}s")]
    ExternalCommandTimedOut { command: String, timeout_secs: u64 },

    /// The import command exited non-zero.
    #[error("import failed: {}", .stderr.trim())]
    ImportFailed { stderr: String },

    /// A REST import was requested without its required parameters.
    #[error("REST import requires {}", .missing.join(", "))]
    InvalidImportArguments { missing: Vec<&'static str> },

    /// Import exited successfully but left no schema files behind.
    #[error("import produced no .graphql files under {}", .dir.display())]
    NoSchemaGenerated { dir: PathBuf },

    /// The external tool could not be located on PATH.
    #[error("external tool `{program}` not found on PATH")]
    ToolNotFound { program: String },

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem operation failed.
    #[error("{context}: {source}")]
    FileSystem {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_bw::Error),
}

impl ProvisionError {
    /// Wrap an IO error with a short description of the failed operation.
    pub fn fs(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileSystem {
            context: context.into(),
            source,
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// A pipeline failure tagged with the step that produced it.
#[derive(Debug, Error)]
#[error("{step} step failed: {source}")]
pub struct StepError {
    pub step: Step,
    #[source]
    pub source: ProvisionError,
}

impl StepError {
    pub fn new(step: Step, source: ProvisionError) -> Self {
        Self { step, source }
    }
}
