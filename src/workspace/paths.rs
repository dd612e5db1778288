//! Typed paths into a provisioning workspace.
//!
//! Centralizing path construction keeps file access consistent across the
//! pipeline steps and the status report.
use super::{
    CACHE_DIR_REL, CONFIG_YAML_REL, GENERATED_SCHEMA_REL, ROOT_SCHEMA_REL, SCHEMA_EXTENSION,
};
use std::path::{Path, PathBuf};

/// Convenience wrapper for locating common workspace artifacts.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    /// Create a new path helper rooted at the workspace directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Return the workspace root used for path derivation.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the tool's `.stepzen/` cache directory, which doubles as the
    /// workspace marker once `init` has run.
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR_REL)
    }

    /// Return the `config.yaml` path.
    pub fn config_yaml_path(&self) -> PathBuf {
        self.root.join(CONFIG_YAML_REL)
    }

    /// Return the generated `schema/index.graphql` path.
    pub fn generated_schema_path(&self) -> PathBuf {
        self.root.join(GENERATED_SCHEMA_REL)
    }

    /// Return the root `index.graphql` path the external tool deploys from.
    pub fn root_schema_path(&self) -> PathBuf {
        self.root.join(ROOT_SCHEMA_REL)
    }

    /// Resolve a possibly relative input path against the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// True when `path` carries the schema-file extension.
pub fn is_schema_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SCHEMA_EXTENSION)
}
