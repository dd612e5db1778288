//! Read-only workspace status.
//!
//! Status inspects the same state the pipeline's idempotence checks use,
//! without running any external command.
use crate::artifacts::{ConfigDescriptor, SchemaDescriptor, CONFIG_NAME};
use crate::error::ProvisionResult;
use crate::util::display_path;
use crate::workspace::{collect_schema_files, is_initialized, CredentialStore, WorkspacePaths};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Snapshot of provisioning state for one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceStatus {
    pub workspace: String,
    pub initialized: bool,
    pub credentials_path: String,
    pub credentials_present: bool,
    pub config_yaml_present: bool,
    /// `config.yaml` parses and declares the shared configuration name.
    pub config_declares_api: bool,
    pub generated_schema_present: bool,
    pub root_schema_present: bool,
    /// The root schema binds a field to the shared configuration name.
    pub root_schema_references_api: bool,
    pub schema_files: Vec<String>,
}

/// Inspect `paths` and the credential store.
pub fn workspace_status(
    paths: &WorkspacePaths,
    credentials: &CredentialStore,
) -> ProvisionResult<WorkspaceStatus> {
    let root = paths.root();
    let schema_files = collect_schema_files(root)?
        .iter()
        .map(|path| display_path(path, Some(root)))
        .collect();
    let root_schema = paths.root_schema_path();
    Ok(WorkspaceStatus {
        workspace: root.display().to_string(),
        initialized: is_initialized(&paths.cache_dir()),
        credentials_path: credentials.path().display().to_string(),
        credentials_present: credentials.credentials_exist(),
        config_yaml_present: paths.config_yaml_path().is_file(),
        config_declares_api: config_declares_api(&paths.config_yaml_path()),
        generated_schema_present: paths.generated_schema_path().is_file(),
        root_schema_present: root_schema.is_file(),
        root_schema_references_api: schema_references_api(&root_schema),
        schema_files,
    })
}

fn config_declares_api(path: &Path) -> bool {
    let Ok(text) = fs::read_to_string(path) else {
        return false;
    };
    serde_yaml_bw::from_str::<ConfigDescriptor>(&text)
        .map(|descriptor| descriptor.contains(CONFIG_NAME))
        .unwrap_or(false)
}

fn schema_references_api(path: &Path) -> bool {
    let Ok(text) = fs::read_to_string(path) else {
        return false;
    };
    SchemaDescriptor {
        path: path.to_path_buf(),
        text,
    }
    .references_configuration(CONFIG_NAME)
}

/// Render a human-readable status summary.
pub fn render_status_text(status: &WorkspaceStatus) -> String {
    let yes_no = |value: bool| if value { "yes" } else { "no" };
    let mut lines = vec![
        format!("workspace: {}", status.workspace),
        format!("initialized: {}", yes_no(status.initialized)),
        format!(
            "credentials: {} ({})",
            yes_no(status.credentials_present),
            status.credentials_path
        ),
        format!(
            "config.yaml: {} (declares api: {})",
            yes_no(status.config_yaml_present),
            yes_no(status.config_declares_api)
        ),
        format!(
            "schema/index.graphql: {}",
            yes_no(status.generated_schema_present)
        ),
        format!(
            "index.graphql: {} (references api: {})",
            yes_no(status.root_schema_present),
            yes_no(status.root_schema_references_api)
        ),
    ];
    if status.schema_files.is_empty() {
        lines.push("schema files: none".to_string());
    } else {
        lines.push(format!("schema files: {}", status.schema_files.join(", ")));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
