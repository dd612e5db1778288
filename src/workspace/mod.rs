//! Workspace layout, configuration, and on-disk state.
//!
//! Relative paths below are the conventions the external tool expects.
/// Tool cache directory; also the marker left behind by `init`.
pub const CACHE_DIR_REL: &str = ".stepzen";
/// Configuration descriptor at the workspace root.
pub const CONFIG_YAML_REL: &str = "config.yaml";
/// Generated schema path.
pub const GENERATED_SCHEMA_REL: &str = "schema/index.graphql";
/// Root schema the tool deploys from.
pub const ROOT_SCHEMA_REL: &str = "index.graphql";
/// Credential file, relative to the home directory.
pub const CREDENTIALS_REL: &str = ".stepzen/credentials";
/// Extension of schema files produced by synthesis or import.
pub const SCHEMA_EXTENSION: &str = "graphql";

mod config;
mod credentials;
mod paths;
mod state;

pub use config::{
    apply_env_overrides, credentials_path, load_config, validate_config, ProvisionConfig,
};
pub use credentials::{CredentialRecord, CredentialStore, CredentialWrite};
pub use paths::WorkspacePaths;
pub use state::{clean_cache, collect_schema_files, is_initialized};
