//! Shared test infrastructure for integration tests.
//!
//! Each fixture owns a temporary workspace, a fake external tool script that
//! logs its argv, and a config file pointing gqlprov at both.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_TOOL: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TOOL_LOG"
case "$1" in
  init)
    mkdir -p .stepzen
    ;;
  import)
    mkdir -p imported
    echo 'type User { id: ID }' > imported/index.graphql
    echo 'schema @sdl(files: ["imported/index.graphql"]) { query: Query }' > index.graphql
    ;;
  deploy)
    if [ -n "$FAKE_DEPLOY_FAIL" ]; then
      echo "auth failed" >&2
      exit 1
    fi
    ;;
esac
exit 0
"#;

/// Temporary workspace wired to a fake external tool.
pub struct Fixture {
    pub _temp: TempDir,
    pub workspace: PathBuf,
    pub config_path: PathBuf,
    pub credentials_path: PathBuf,
    pub log_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = temp.path().join("workspace");
        std::fs::create_dir_all(&workspace).expect("create workspace");
        std::fs::write(workspace.join("user.txt"), "type User { id: ID }\n")
            .expect("write fragment");

        let tool_path = temp.path().join("bin/stepzen");
        write_executable(&tool_path, FAKE_TOOL);

        let credentials_path = temp.path().join("home/.stepzen/credentials");
        let log_path = temp.path().join("tool.log");
        let config_path = temp.path().join("provision.json");
        let config = serde_json::json!({
            "account": "acme",
            "admin_key": "acme::key",
            "rest_endpoint": "https://example.test/users",
            "tool_command": tool_path.display().to_string(),
            "timeout_secs": 30,
            "credentials_path": credentials_path.display().to_string(),
        });
        std::fs::write(
            &config_path,
            serde_json::to_string_pretty(&config).expect("serialize config"),
        )
        .expect("write config");

        Self {
            _temp: temp,
            workspace,
            config_path,
            credentials_path,
            log_path,
        }
    }

    /// Build a gqlprov command for `subcommand` against this fixture.
    pub fn command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gqlprov"));
        cmd.arg(subcommand)
            .arg("--workspace")
            .arg(&self.workspace)
            .arg("--config")
            .arg(&self.config_path)
            .env("FAKE_TOOL_LOG", &self.log_path)
            .env_remove("FAKE_DEPLOY_FAIL")
            .env_remove("STEPZEN_ACCOUNT")
            .env_remove("STEPZEN_ADMINKEY")
            .env_remove("STEPZEN_DOMAIN")
            .env_remove("GQLPROV_TOOL_COMMAND")
            .env("RUST_LOG", "warn");
        cmd
    }

    pub fn run(&self, cmd: &mut Command) -> Output {
        cmd.output().expect("run gqlprov")
    }

    /// Tool invocations recorded by the fake script, one argv per line.
    pub fn tool_calls(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_path)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.workspace.join(rel)
    }
}

fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create script dir");
    }
    std::fs::write(path, contents).expect("write script");
    let mut perms = std::fs::metadata(path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod script");
}
