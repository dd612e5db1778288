//! The provisioning pipeline.
//!
//! Steps run in a fixed order and the first failure aborts the run. Side
//! effects of completed steps are left in place; re-running is safe because
//! each step checks the state it would create.
use super::Step;
use crate::artifacts::{self, QueryBinding};
use crate::error::{ProvisionError, ProvisionResult, StepError};
use crate::tool::{run_checked, run_checked_with, run_import, ImportSource, InvokeOptions, ToolRunner};
use crate::workspace::{
    clean_cache, is_initialized, CredentialRecord, CredentialStore, CredentialWrite,
    ProvisionConfig, WorkspacePaths, CACHE_DIR_REL,
};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// How the Configure step produces schema files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureMode {
    /// Synthesize the schema locally from the base fragment.
    Static,
    /// Derive schema files with the tool's `import` subcommand.
    Import(ImportSource),
}

/// Caller choices for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub mode: ConfigureMode,
    /// Remove the tool cache before init.
    pub clean: bool,
    /// Run `start` after a successful deploy.
    pub start: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            mode: ConfigureMode::Static,
            clean: true,
            start: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Ran,
    Skipped,
}

/// What a finished step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub action: StepAction,
    pub detail: String,
    pub elapsed_ms: u128,
}

/// Outcomes of every step that completed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub api_name: String,
    pub steps: Vec<StepOutcome>,
}

impl PipelineReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for outcome in &self.steps {
            let action = match outcome.action {
                StepAction::Ran => "ran",
                StepAction::Skipped => "skipped",
            };
            out.push_str(&format!(
                "{:<10} {:<8} {}\n",
                outcome.step.as_str(),
                action,
                outcome.detail
            ));
        }
        out
    }
}

type StepResult = ProvisionResult<(StepAction, String)>;

/// Orchestrates workspace state, artifacts, and tool calls for one run.
pub struct ProvisioningPipeline<'a> {
    config: &'a ProvisionConfig,
    paths: WorkspacePaths,
    credentials: CredentialStore,
    runner: &'a dyn ToolRunner,
}

impl<'a> ProvisioningPipeline<'a> {
    pub fn new(
        config: &'a ProvisionConfig,
        credentials: CredentialStore,
        runner: &'a dyn ToolRunner,
    ) -> Self {
        Self {
            config,
            paths: WorkspacePaths::new(config.workspace_dir.clone()),
            credentials,
            runner,
        }
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self, options: &PipelineOptions) -> Result<PipelineReport, StepError> {
        let mut report = PipelineReport {
            api_name: self.config.api_name.clone(),
            steps: Vec::with_capacity(Step::ALL.len()),
        };
        for step in Step::ALL {
            let start = Instant::now();
            tracing::info!(step = %step, "step started");
            let result = match step {
                Step::Clean => self.clean(options.clean),
                Step::Init => self.init(),
                Step::Login => self.login(),
                Step::Configure => self.configure(&options.mode),
                Step::Verify => self.verify(&options.mode),
                Step::Deploy => self.deploy(),
                Step::Start => self.start(options.start),
            };
            let elapsed_ms = start.elapsed().as_millis();
            let (action, detail) = result.map_err(|err| {
                tracing::error!(step = %step, elapsed_ms, error = %err, "step failed");
                StepError::new(step, err)
            })?;
            tracing::info!(step = %step, elapsed_ms, ?action, "{detail}");
            report.steps.push(StepOutcome {
                step,
                action,
                detail,
                elapsed_ms,
            });
        }
        Ok(report)
    }

    /// Remove the tool cache so `init` starts from a clean workspace.
    pub fn clean(&self, enabled: bool) -> StepResult {
        if !enabled {
            return Ok((StepAction::Skipped, "cache kept by request".to_string()));
        }
        if clean_cache(&self.paths.cache_dir())? {
            Ok((StepAction::Ran, format!("removed {CACHE_DIR_REL}")))
        } else {
            Ok((StepAction::Skipped, format!("no {CACHE_DIR_REL} to remove")))
        }
    }

    /// Run `init` when the workspace marker is absent.
    ///
    /// The tool runs inside the workspace, so the directory is passed as `.`.
    pub fn init(&self) -> StepResult {
        if is_initialized(&self.paths.cache_dir()) {
            return Ok((StepAction::Skipped, "workspace already initialized".to_string()));
        }
        run_checked(self.runner, &["init", "."])?;
        Ok((StepAction::Ran, "initialized workspace".to_string()))
    }

    /// Write the credential record once and verify it.
    pub fn login(&self) -> StepResult {
        let record = CredentialRecord {
            account: self.config.account.clone(),
            admin_key: self.config.admin_key.clone(),
            domain: self.config.domain.clone(),
        };
        match self.credentials.write_credentials(&record, self.runner)? {
            CredentialWrite::AlreadyPresent => Ok((
                StepAction::Skipped,
                format!("credentials present at {}", self.credentials.path().display()),
            )),
            CredentialWrite::Written => Ok((
                StepAction::Ran,
                format!("credentials written to {}", self.credentials.path().display()),
            )),
        }
    }

    /// Produce the configuration descriptor and schema files.
    pub fn configure(&self, mode: &ConfigureMode) -> StepResult {
        match mode {
            ConfigureMode::Static => {
                artifacts::synthesize_config(&self.paths)?;
                let binding = QueryBinding {
                    field: self.config.query_field.clone(),
                    type_name: self.config.query_type.clone(),
                    headers: self.config.rest_headers.clone(),
                };
                let fragment = self.paths.resolve(&self.config.base_fragment);
                let schema = artifacts::synthesize_schema(
                    &self.paths,
                    &fragment,
                    &self.config.rest_endpoint,
                    &binding,
                )?;
                Ok((
                    StepAction::Ran,
                    format!("wrote config.yaml and {}", self.display(&schema.path)),
                ))
            }
            ConfigureMode::Import(source) => {
                let generated = run_import(self.runner, source, self.paths.root())?;
                artifacts::synthesize_config(&self.paths)?;
                let files = generated
                    .iter()
                    .map(|path| self.display(path))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok((
                    StepAction::Ran,
                    format!("imported {} schema file(s): {files}", generated.len()),
                ))
            }
        }
    }

    /// Make sure the root schema the tool deploys from exists.
    ///
    /// A locally synthesized schema is always mirrored when the root copy
    /// differs; after an import the tool's own root schema is kept.
    pub fn verify(&self, mode: &ConfigureMode) -> StepResult {
        let generated = self.paths.generated_schema_path();
        let root = self.paths.root_schema_path();
        let mirror = match mode {
            ConfigureMode::Static => !root.is_file() || !same_contents(&generated, &root)?,
            ConfigureMode::Import(_) => !root.is_file(),
        };
        if !mirror {
            return Ok((StepAction::Skipped, format!("{} is current", self.display(&root))));
        }
        if !generated.is_file() && !root.is_file() {
            return Err(ProvisionError::SchemaNotFound { path: root });
        }
        artifacts::mirror_schema(&generated, &root)?;
        Ok((
            StepAction::Ran,
            format!("copied {} to {}", self.display(&generated), self.display(&root)),
        ))
    }

    pub fn deploy(&self) -> StepResult {
        run_checked(self.runner, &["deploy", self.config.api_name.as_str()])?;
        Ok((StepAction::Ran, format!("deployed {}", self.config.api_name)))
    }

    /// Serve the API in the foreground; runs until the tool exits.
    pub fn start(&self, enabled: bool) -> StepResult {
        if !enabled {
            return Ok((StepAction::Skipped, "start disabled".to_string()));
        }
        run_checked_with(self.runner, &["start"], InvokeOptions::FOREGROUND)?;
        Ok((StepAction::Ran, "tool exited".to_string()))
    }

    fn display(&self, path: &Path) -> String {
        crate::util::display_path(path, Some(self.paths.root()))
    }
}

fn same_contents(a: &Path, b: &Path) -> ProvisionResult<bool> {
    if !a.is_file() || !b.is_file() {
        return Ok(false);
    }
    let read = |path: &Path| {
        fs::read(path).map_err(|err| ProvisionError::fs(format!("read {}", path.display()), err))
    };
    Ok(read(a)? == read(b)?)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
