//! GraphQL schema synthesis and mirroring.
use super::CONFIG_NAME;
use crate::error::{ProvisionError, ProvisionResult};
use crate::workspace::WorkspacePaths;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The generated `Query` field and the REST headers it forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    pub field: String,
    pub type_name: String,
    pub headers: BTreeMap<String, String>,
}

/// A schema document written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub path: PathBuf,
    pub text: String,
}

impl SchemaDescriptor {
    /// True when the document binds a field to configuration `name`.
    pub fn references_configuration(&self, name: &str) -> bool {
        self.text
            .contains(&format!("configuration: \"{}\"", escape_graphql_string(name)))
    }
}

/// Render the schema text: the trimmed fragment followed by the `Query` block.
pub fn render_schema(base_fragment: &str, rest_endpoint: &str, binding: &QueryBinding) -> String {
    let mut directive_args = format!(
        "endpoint: \"{}\", configuration: \"{}\"",
        escape_graphql_string(rest_endpoint),
        CONFIG_NAME
    );
    if !binding.headers.is_empty() {
        let headers = binding
            .headers
            .iter()
            .map(|(name, value)| {
                format!(
                    "{{ name: \"{}\", value: \"{}\" }}",
                    escape_graphql_string(name),
                    escape_graphql_string(value)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        directive_args.push_str(&format!(", headers: [{headers}]"));
    }
    let query = format!(
        "type Query {{\n  {}: [{}] @rest({directive_args})\n}}",
        binding.field, binding.type_name
    );
    let base = base_fragment.trim();
    if base.is_empty() {
        query
    } else {
        format!("{base}\n\n{query}")
    }
}

/// Read the base fragment, append the `Query` block, and write
/// `schema/index.graphql`.
///
/// Nothing is written when the fragment is missing.
pub fn synthesize_schema(
    paths: &WorkspacePaths,
    base_fragment_path: &Path,
    rest_endpoint: &str,
    binding: &QueryBinding,
) -> ProvisionResult<SchemaDescriptor> {
    if !base_fragment_path.is_file() {
        return Err(ProvisionError::MissingBaseFragment {
            path: base_fragment_path.to_path_buf(),
        });
    }
    let base = fs::read_to_string(base_fragment_path).map_err(|err| {
        ProvisionError::fs(format!("read {}", base_fragment_path.display()), err)
    })?;
    let text = render_schema(&base, rest_endpoint, binding);

    let path = paths.generated_schema_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| ProvisionError::fs(format!("create {}", parent.display()), err))?;
    }
    fs::write(&path, text.as_bytes())
        .map_err(|err| ProvisionError::fs(format!("write {}", path.display()), err))?;
    tracing::info!(path = %path.display(), "wrote schema");
    Ok(SchemaDescriptor { path, text })
}

/// Copy the generated schema to the path the external tool deploys from.
pub fn mirror_schema(src: &Path, dest: &Path) -> ProvisionResult<()> {
    if !src.is_file() {
        return Err(ProvisionError::SchemaNotFound {
            path: src.to_path_buf(),
        });
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| ProvisionError::fs(format!("create {}", parent.display()), err))?;
    }
    fs::copy(src, dest).map_err(|err| {
        ProvisionError::fs(
            format!("copy {} to {}", src.display(), dest.display()),
            err,
        )
    })?;
    tracing::info!(src = %src.display(), dest = %dest.display(), "mirrored schema");
    Ok(())
}

fn escape_graphql_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
