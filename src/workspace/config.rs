//! Provisioning configuration.
//!
//! Configuration is layered once at startup (defaults, optional JSON file,
//! environment, CLI flags), validated, and then passed by reference to every
//! step. Nothing mutates it during a run.
use crate::error::{ProvisionError, ProvisionResult};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default managed-backend domain.
pub const DEFAULT_DOMAIN: &str = "us-east-a.ibm.stepzen.net";
/// Default deployment endpoint, as `folder/name`.
pub const DEFAULT_API_NAME: &str = "GQL/my_first_stepzen";
/// Default REST source for the generated `Query` field.
pub const DEFAULT_REST_ENDPOINT: &str = "https://fake-json-api.mock.beeceptor.com/users";
/// Default base schema fragment, relative to the workspace.
pub const DEFAULT_BASE_FRAGMENT: &str = "user.txt";
/// Default external tool command line.
pub const DEFAULT_TOOL_COMMAND: &str = "stepzen";
/// Default per-command timeout for checked and import invocations.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variables consulted after the config file.
pub const ENV_ACCOUNT: &str = "STEPZEN_ACCOUNT";
pub const ENV_ADMIN_KEY: &str = "STEPZEN_ADMINKEY";
pub const ENV_DOMAIN: &str = "STEPZEN_DOMAIN";
pub const ENV_TOOL_COMMAND: &str = "GQLPROV_TOOL_COMMAND";

static API_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").expect("api name pattern compiles")
});
static GRAPHQL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("graphql name pattern compiles")
});

/// Immutable inputs for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    pub workspace_dir: PathBuf,
    pub api_name: String,
    pub domain: String,
    pub account: String,
    pub admin_key: String,
    pub rest_endpoint: String,
    /// Headers forwarded to the REST source; empty by default.
    pub rest_headers: BTreeMap<String, String>,
    pub base_fragment: PathBuf,
    pub query_field: String,
    pub query_type: String,
    pub tool_command: String,
    pub timeout_secs: u64,
    /// Overrides `~/.stepzen/credentials`.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("."),
            api_name: DEFAULT_API_NAME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            account: String::new(),
            admin_key: String::new(),
            rest_endpoint: DEFAULT_REST_ENDPOINT.to_string(),
            rest_headers: BTreeMap::new(),
            base_fragment: PathBuf::from(DEFAULT_BASE_FRAGMENT),
            query_field: "users".to_string(),
            query_type: "User".to_string(),
            tool_command: DEFAULT_TOOL_COMMAND.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            credentials_path: None,
        }
    }
}

/// Load a config file, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ProvisionConfig> {
    let Some(path) = path else {
        return Ok(ProvisionConfig::default());
    };
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ProvisionConfig =
        serde_json::from_slice(&bytes).context("parse provisioning config JSON")?;
    Ok(config)
}

/// Apply environment overrides through `lookup` so tests need not touch the
/// process environment.
pub fn apply_env_overrides<F>(config: &mut ProvisionConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(account) = non_empty(ENV_ACCOUNT) {
        config.account = account;
    }
    if let Some(admin_key) = non_empty(ENV_ADMIN_KEY) {
        config.admin_key = admin_key;
    }
    if let Some(domain) = non_empty(ENV_DOMAIN) {
        config.domain = domain;
    }
    if let Some(command) = non_empty(ENV_TOOL_COMMAND) {
        config.tool_command = command;
    }
}

/// Validate user-provided values before any step runs.
pub fn validate_config(config: &ProvisionConfig) -> ProvisionResult<()> {
    if !API_NAME_RE.is_match(&config.api_name) {
        return Err(ProvisionError::InvalidConfig(format!(
            "api_name must look like folder/name (got {:?})",
            config.api_name
        )));
    }
    if !(config.rest_endpoint.starts_with("http://") || config.rest_endpoint.starts_with("https://"))
    {
        return Err(ProvisionError::InvalidConfig(format!(
            "rest_endpoint must be an http(s) URL (got {:?})",
            config.rest_endpoint
        )));
    }
    for (label, value) in [
        ("query_field", &config.query_field),
        ("query_type", &config.query_type),
    ] {
        if !GRAPHQL_NAME_RE.is_match(value) {
            return Err(ProvisionError::InvalidConfig(format!(
                "{label} must be a GraphQL name (got {value:?})"
            )));
        }
    }
    if config.domain.trim().is_empty() {
        return Err(ProvisionError::InvalidConfig("domain must be non-empty".to_string()));
    }
    if config.tool_command.trim().is_empty() {
        return Err(ProvisionError::InvalidConfig(
            "tool_command must be non-empty".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(ProvisionError::InvalidConfig(
            "timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.rest_headers.keys().any(|name| name.trim().is_empty()) {
        return Err(ProvisionError::InvalidConfig(
            "rest_headers names must be non-empty".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the credential file location, honoring the config override.
pub fn credentials_path(config: &ProvisionConfig) -> ProvisionResult<PathBuf> {
    if let Some(path) = &config.credentials_path {
        return Ok(path.clone());
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ProvisionError::InvalidConfig("cannot determine home directory".to_string())
    })?;
    Ok(home.join(super::CREDENTIALS_REL))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
