//! Tool-driven schema import.
//!
//! A REST import needs three extra parameters; they are checked before any
//! process is spawned. A successful import must create or rewrite at least
//! one schema file. Files that were already on disk and left untouched are
//! not counted, so leftovers from an earlier run never satisfy an import.
use super::{format_command_line, InvokeOptions, ToolRunner};
use crate::error::{ProvisionError, ProvisionResult};
use crate::workspace::collect_schema_files;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Source kind selecting the REST (curl) importer.
pub const IMPORT_KIND_REST: &str = "rest";
/// Subcommand argument the external tool uses for REST sources.
const CURL_KIND: &str = "curl";

/// A source the external tool can derive schema files from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Rest {
        endpoint: String,
        query_name: Option<String>,
        query_type: Option<String>,
        name: Option<String>,
        headers: BTreeMap<String, String>,
    },
    Other {
        kind: String,
        connection: Option<String>,
    },
}

impl ImportSource {
    /// True for the kinds routed to the REST importer.
    pub fn is_rest_kind(kind: &str) -> bool {
        kind.eq_ignore_ascii_case(IMPORT_KIND_REST) || kind.eq_ignore_ascii_case(CURL_KIND)
    }

    /// Build the `import ...` argv, validating REST parameters.
    pub fn argv(&self) -> ProvisionResult<Vec<String>> {
        match self {
            ImportSource::Rest {
                endpoint,
                query_name,
                query_type,
                name,
                headers,
            } => {
                let mut missing = Vec::new();
                let query_name = required(query_name, "query_name", &mut missing);
                let query_type = required(query_type, "query_type", &mut missing);
                let name = required(name, "name", &mut missing);
                let (Some(query_name), Some(query_type), Some(name)) =
                    (query_name, query_type, name)
                else {
                    return Err(ProvisionError::InvalidImportArguments { missing });
                };
                let mut argv = vec![
                    "import".to_string(),
                    CURL_KIND.to_string(),
                    endpoint.clone(),
                    "--query-name".to_string(),
                    query_name.to_string(),
                    "--query-type".to_string(),
                    query_type.to_string(),
                    "--name".to_string(),
                    name.to_string(),
                ];
                for (header, value) in headers {
                    argv.push("--header".to_string());
                    argv.push(format!("{header}: {value}"));
                }
                Ok(argv)
            }
            ImportSource::Other { kind, connection } => {
                let mut argv = vec!["import".to_string(), kind.clone()];
                argv.extend(connection.iter().cloned());
                Ok(argv)
            }
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    label: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<&'a str> {
    let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty());
    if value.is_none() {
        missing.push(label);
    }
    value
}

/// Run the import in captured mode and return the schema files it created or
/// rewrote under `target_dir`.
pub fn run_import(
    runner: &dyn ToolRunner,
    source: &ImportSource,
    target_dir: &Path,
) -> ProvisionResult<Vec<PathBuf>> {
    let argv = source.argv()?;
    let before = snapshot_schema_files(target_dir)?;
    tracing::info!(
        command = %format_command_line(&argv),
        existing_files = before.len(),
        "importing schema"
    );
    let output = runner.run(&argv, InvokeOptions::CAPTURED)?;
    if !output.success() {
        let stderr = if output.stderr.trim().is_empty() {
            format!("exit code {:?}", output.exit_code)
        } else {
            output.stderr
        };
        return Err(ProvisionError::ImportFailed { stderr });
    }
    let generated: Vec<PathBuf> = snapshot_schema_files(target_dir)?
        .into_iter()
        .filter(|(path, after)| before.get(path) != Some(after))
        .map(|(path, _)| path)
        .collect();
    if generated.is_empty() {
        return Err(ProvisionError::NoSchemaGenerated {
            dir: target_dir.to_path_buf(),
        });
    }
    tracing::info!(files = generated.len(), "import generated schema files");
    Ok(generated)
}

/// Modification time and contents of one schema file.
#[derive(Debug, PartialEq, Eq)]
struct SchemaFingerprint {
    modified: Option<SystemTime>,
    contents: Vec<u8>,
}

fn snapshot_schema_files(root: &Path) -> ProvisionResult<BTreeMap<PathBuf, SchemaFingerprint>> {
    let mut snapshot = BTreeMap::new();
    for path in collect_schema_files(root)? {
        let contents = fs::read(&path)
            .map_err(|err| ProvisionError::fs(format!("read {}", path.display()), err))?;
        let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok();
        snapshot.insert(path, SchemaFingerprint { modified, contents });
    }
    Ok(snapshot)
}
