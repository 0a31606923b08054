//! CLI integration tests

use std::process::{Command, Output};

use mockito::Matcher;

fn yarn_stats(home: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_yarn-stats"))
        .args(args)
        .env("HOME", home)
        .env_remove("YARN_RESOURCEMANAGER_URI")
        .env_remove("YARN_USER_PATTERN")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = yarn_stats(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("YARN ResourceManager"), "Should show app description");
    assert!(stdout.contains("collect"), "Should show collect command");
    assert!(stdout.contains("apps"), "Should show apps command");
    assert!(
        stdout.contains("--resourcemanager-uri"),
        "Should show endpoint option"
    );
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = yarn_stats(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("yarn-stats"), "Should show binary name");
}

/// Test apps subcommand help
#[test]
fn test_apps_help() {
    let home = tempfile::tempdir().unwrap();
    let output = yarn_stats(home.path(), &["apps", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Apps help should succeed");
    assert!(stdout.contains("--by"), "Should show by option");
    assert!(stdout.contains("--status"), "Should show status option");
}

/// Test that a missing endpoint is reported before any request
#[test]
fn test_missing_endpoint_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = yarn_stats(home.path(), &["collect"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Collect without endpoint should fail");
    assert!(
        stderr.contains("resourcemanager_uri"),
        "Should name the missing setting"
    );
}

/// Test one collection against a mock ResourceManager
#[test]
fn test_collect_json() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/ws/v1/cluster/apps")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"apps":{"app":[{"user":"alice","queue":"default","allocatedMB":2000}]}}"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let output = yarn_stats(
        home.path(),
        &[
            "--resourcemanager-uri",
            &server.url(),
            "--format",
            "json",
            "collect",
            "--at",
            "2024-05-01T12:30:00Z",
        ],
    );
    assert!(output.status.success(), "Collect should succeed");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["running_apps"], 1);
    assert_eq!(report["summary"]["aborted"], false);
    assert_eq!(report["summary"]["completed_pass"], false);
    let gauges = report["gauges"].as_array().unwrap();
    assert!(gauges
        .iter()
        .any(|g| g["name"] == "yarn.apps.allocated_gb" && g["value"] == 2.0));
}

/// Test apps grouping with the endpoint taken from the config file
#[test]
fn test_apps_uses_config_file() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/ws/v1/cluster/apps")
        .match_query(Matcher::UrlEncoded("states".into(), "RUNNING".into()))
        .with_status(200)
        .with_body(
            r#"{"apps":{"app":[
                {"user":"alice","queue":"default"},
                {"user":"bob","queue":"default"},
                {"user":"carol","queue":"etl"}
            ]}}"#,
        )
        .create();

    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".config").join("yarn-stats");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        format!(r#"{{"resourcemanager_uri": "{}"}}"#, server.url()),
    )
    .unwrap();

    let output = yarn_stats(home.path(), &["--format", "json", "apps", "--by", "queue"]);
    assert!(output.status.success(), "Apps should succeed");

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["group"], "queue:default");
    assert_eq!(rows[0]["apps"], 2);
    assert_eq!(rows[1]["group"], "queue:etl");
}
