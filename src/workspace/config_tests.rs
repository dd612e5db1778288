use super::{
    apply_env_overrides, credentials_path, load_config, validate_config, ProvisionConfig,
    DEFAULT_API_NAME, ENV_ACCOUNT, ENV_ADMIN_KEY, ENV_TOOL_COMMAND,
};
use crate::error::ProvisionError;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[test]
fn defaults_pass_validation() {
    let config = ProvisionConfig::default();
    assert_eq!(config.api_name, DEFAULT_API_NAME);
    validate_config(&config).expect("defaults are valid");
}

#[test]
fn load_config_merges_file_values_over_defaults() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("provision.json");
    std::fs::write(
        &path,
        r#"{ "api_name": "demo/users", "rest_headers": { "Authorization": "Bearer x" } }"#,
    )
    .expect("write config");

    let config = load_config(Some(&path)).expect("load config");
    assert_eq!(config.api_name, "demo/users");
    assert_eq!(
        config.rest_headers.get("Authorization").map(String::as_str),
        Some("Bearer x")
    );
    assert_eq!(config.query_field, "users");
}

#[test]
fn load_config_rejects_unknown_fields() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("provision.json");
    std::fs::write(&path, r#"{ "api_nmae": "demo/users" }"#).expect("write config");

    assert!(load_config(Some(&path)).is_err());
}

#[test]
fn env_overrides_skip_blank_values() {
    let mut env = BTreeMap::new();
    env.insert(ENV_ACCOUNT, "acme".to_string());
    env.insert(ENV_ADMIN_KEY, "   ".to_string());
    env.insert(ENV_TOOL_COMMAND, "npx stepzen".to_string());
    let mut config = ProvisionConfig {
        admin_key: "from-file".to_string(),
        ..ProvisionConfig::default()
    };

    apply_env_overrides(&mut config, |key| env.get(key).cloned());

    assert_eq!(config.account, "acme");
    assert_eq!(config.admin_key, "from-file");
    assert_eq!(config.tool_command, "npx stepzen");
}

#[test]
fn validate_rejects_malformed_api_name() {
    let config = ProvisionConfig {
        api_name: "no-folder".to_string(),
        ..ProvisionConfig::default()
    };
    let err = validate_config(&config).expect_err("api name without folder");
    assert!(matches!(err, ProvisionError::InvalidConfig(_)));
}

#[test]
fn validate_rejects_non_http_endpoint_and_zero_timeout() {
    let config = ProvisionConfig {
        rest_endpoint: "ftp://example.test".to_string(),
        ..ProvisionConfig::default()
    };
    assert!(validate_config(&config).is_err());

    let config = ProvisionConfig {
        timeout_secs: 0,
        ..ProvisionConfig::default()
    };
    assert!(validate_config(&config).is_err());
}

#[test]
fn credentials_path_prefers_override() {
    let config = ProvisionConfig {
        credentials_path: Some(PathBuf::from("/tmp/creds")),
        ..ProvisionConfig::default()
    };
    assert_eq!(
        credentials_path(&config).expect("resolve override"),
        PathBuf::from("/tmp/creds")
    );
}
