#![cfg(unix)]

mod common;

use common::Fixture;

#[test]
fn provision_runs_every_step_against_the_tool() {
    let fixture = Fixture::new();
    let output = fixture.run(fixture.command("provision").arg("--no-start").arg("--json"));
    assert!(
        output.status.success(),
        "provision failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse report json");
    assert_eq!(report["api_name"], "GQL/my_first_stepzen");
    let steps: Vec<&str> = report["steps"]
        .as_array()
        .expect("steps array")
        .iter()
        .map(|step| step["step"].as_str().expect("step name"))
        .collect();
    assert_eq!(
        steps,
        vec!["clean", "init", "login", "configure", "verify", "deploy", "start"]
    );
    assert_eq!(report["steps"][6]["action"], "skipped");

    assert_eq!(
        fixture.tool_calls(),
        vec!["init .", "whoami", "deploy GQL/my_first_stepzen"]
    );

    let generated = std::fs::read_to_string(fixture.path("schema/index.graphql"))
        .expect("read generated schema");
    assert!(generated.starts_with("type User { id: ID }\n\ntype Query {"));
    assert!(generated.contains(
        "users: [User] @rest(endpoint: \"https://example.test/users\", configuration: \"api\")"
    ));
    let root = std::fs::read_to_string(fixture.path("index.graphql")).expect("read root schema");
    assert_eq!(root, generated);

    let config_yaml =
        std::fs::read_to_string(fixture.path("config.yaml")).expect("read config.yaml");
    assert!(config_yaml.contains("configurationset"));
    assert!(config_yaml.contains("rest_backend"));

    let credentials =
        std::fs::read_to_string(&fixture.credentials_path).expect("read credentials");
    assert!(credentials.contains("account: acme"));
    assert!(credentials.contains("adminkey: acme::key"));
    assert!(credentials.contains("domain: us-east-a.ibm.stepzen.net"));
}

#[test]
fn deploy_failure_surfaces_tool_stderr_and_skips_start() {
    let fixture = Fixture::new();
    let output = fixture.run(fixture.command("provision").env("FAKE_DEPLOY_FAIL", "1"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("deploy step failed"), "stderr: {stderr}");
    assert!(stderr.contains("auth failed"), "stderr: {stderr}");

    let calls = fixture.tool_calls();
    assert_eq!(calls.last().map(String::as_str), Some("deploy GQL/my_first_stepzen"));
    assert!(!calls.iter().any(|call| call == "start"));
}

#[test]
fn rerun_with_kept_cache_and_credentials_skips_init_and_whoami() {
    let fixture = Fixture::new();
    let first = fixture.run(fixture.command("provision").arg("--no-start"));
    assert!(first.status.success());

    let second = fixture.run(
        fixture
            .command("provision")
            .arg("--no-start")
            .arg("--keep-cache"),
    );
    assert!(
        second.status.success(),
        "second provision failed: {}",
        String::from_utf8_lossy(&second.stderr)
    );

    let calls = fixture.tool_calls();
    assert_eq!(calls.iter().filter(|call| call.starts_with("init ")).count(), 1);
    assert_eq!(calls.iter().filter(|call| *call == "whoami").count(), 1);
    assert_eq!(
        calls
            .iter()
            .filter(|call| *call == "deploy GQL/my_first_stepzen")
            .count(),
        2
    );
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("workspace already initialized"), "stdout: {stdout}");
}

#[test]
fn import_mode_without_required_arguments_never_invokes_import() {
    let fixture = Fixture::new();
    let output = fixture.run(
        fixture
            .command("provision")
            .arg("--mode")
            .arg("import")
            .arg("--no-start"),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configure step failed"), "stderr: {stderr}");
    assert!(stderr.contains("query_name"), "stderr: {stderr}");
    assert!(!fixture
        .tool_calls()
        .iter()
        .any(|call| call.starts_with("import")));
    assert!(!fixture.path("index.graphql").exists());
}

#[test]
fn import_mode_keeps_the_schema_the_tool_wrote() {
    let fixture = Fixture::new();
    let output = fixture.run(
        fixture
            .command("provision")
            .args(["--mode", "import", "--no-start"])
            .args(["--query-name", "users", "--query-type", "User"])
            .args(["--import-name", "users"]),
    );
    assert!(
        output.status.success(),
        "provision failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let calls = fixture.tool_calls();
    assert!(calls.contains(
        &"import curl https://example.test/users --query-name users --query-type User --name users"
            .to_string()
    ));
    let root = std::fs::read_to_string(fixture.path("index.graphql")).expect("read root schema");
    assert!(root.contains("@sdl"));
    assert!(fixture.path("config.yaml").is_file());
}

#[test]
fn status_reports_provisioned_workspace_as_json() {
    let fixture = Fixture::new();
    let provision = fixture.run(fixture.command("provision").arg("--no-start"));
    assert!(provision.status.success());

    let output = fixture.run(fixture.command("status").arg("--json"));
    assert!(output.status.success());
    let status: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse status json");
    assert_eq!(status["initialized"], true);
    assert_eq!(status["credentials_present"], true);
    assert_eq!(status["config_declares_api"], true);
    assert_eq!(status["root_schema_references_api"], true);
    assert_eq!(
        status["schema_files"],
        serde_json::json!(["index.graphql", "schema/index.graphql"])
    );
    assert_eq!(fixture.tool_calls().len(), 3, "status must not call the tool");
}

#[test]
fn clean_removes_the_cache_directory() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(fixture.path(".stepzen/cache")).expect("create cache");

    let output = fixture.run(&mut fixture.command("clean"));
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("removed "));
    assert!(!fixture.path(".stepzen").exists());

    let again = fixture.run(&mut fixture.command("clean"));
    assert!(again.status.success());
    assert!(String::from_utf8_lossy(&again.stdout).starts_with("no cache at "));
}

#[test]
fn invalid_api_name_is_rejected_before_any_tool_call() {
    let fixture = Fixture::new();
    let output = fixture.run(
        fixture
            .command("provision")
            .args(["--api-name", "no-folder"]),
    );

    assert!(!output.status.success());
    assert!(fixture.tool_calls().is_empty());
    assert!(!fixture.path("config.yaml").exists());
}
