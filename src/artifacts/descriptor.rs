//! `config.yaml` configuration-set descriptor.
use super::CONFIG_NAME;
use crate::error::{ProvisionError, ProvisionResult};
use crate::workspace::WorkspacePaths;
use serde::{Deserialize, Serialize};
use std::fs;

/// Configuration kind written for the REST backend entry.
pub const CONFIG_KIND: &str = "rest_backend";

/// Top-level `configurationset` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDescriptor {
    pub configurationset: Vec<ConfigurationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    pub configuration: NamedConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedConfiguration {
    pub name: String,
    pub configuration: String,
}

impl ConfigDescriptor {
    /// The single-entry configuration set referenced by generated schemas.
    pub fn rest_backend() -> Self {
        Self {
            configurationset: vec![ConfigurationEntry {
                configuration: NamedConfiguration {
                    name: CONFIG_NAME.to_string(),
                    configuration: CONFIG_KIND.to_string(),
                },
            }],
        }
    }

    /// True when an entry with `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.configurationset
            .iter()
            .any(|entry| entry.configuration.name == name)
    }
}

/// Write `config.yaml` at the workspace root, replacing any prior file.
pub fn synthesize_config(paths: &WorkspacePaths) -> ProvisionResult<ConfigDescriptor> {
    let descriptor = ConfigDescriptor::rest_backend();
    let text = serde_yaml_bw::to_string(&descriptor)?;
    let path = paths.config_yaml_path();
    fs::write(&path, text.as_bytes())
        .map_err(|err| ProvisionError::fs(format!("write {}", path.display()), err))?;
    tracing::info!(path = %path.display(), "wrote configuration descriptor");
    Ok(descriptor)
}
