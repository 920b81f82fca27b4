//! End-to-end tests for the flatup binary
//!
//! Exercises the compiled CLI with assert_cmd against mockito-backed
//! sources, covering exit codes, JSON output, and dry-run behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn flatup() -> Command {
    Command::cargo_bin("flatup").expect("Failed to find flatup binary")
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// One scrape-checked module at 1.0 in the manifest, with 1.1 available.
fn write_fixture(dir: &Path, server_url: &str) {
    write(
        dir,
        "rules.yml",
        &format!(
            r#"
modules:
  - name: app
    get_version:
      type: scrape
      url: {server}/downloads
      regex: app-([0-9.]+)\.tar\.gz
    source_url: {server}/files/app-{{version}}.tar.gz
"#,
            server = server_url
        ),
    );
    write(
        dir,
        "manifest.yml",
        r#"
modules:
  - name: app
    sources:
      - url: https://upstream.example/app-1.0.tar.gz
        sha256: 1111111111111111111111111111111111111111111111111111111111111111
"#,
    );
    fs::create_dir_all(dir.join("templates")).unwrap();
    write(
        dir,
        "templates/manifest.yml.j2",
        "version: {{ app_version }}\n",
    );
}

fn mock_update_server(server: &mut mockito::Server) {
    server
        .mock("GET", "/downloads")
        .with_status(200)
        .with_body("app-1.0.tar.gz app-1.1.tar.gz")
        .create();
    server
        .mock("GET", "/files/app-1.1.tar.gz")
        .with_status(200)
        .with_body("artifact payload")
        .create();
}

#[test]
fn test_missing_config_fails_with_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "manifest.yml", "modules: []\n");

    flatup()
        .args(["-c", "no-such-rules.yml", "-m"])
        .arg(dir.path().join("manifest.yml"))
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_update_run_renders_template_and_reports_change() {
    let mut server = mockito::Server::new();
    mock_update_server(&mut server);

    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), &server.url());

    flatup()
        .arg("-c")
        .arg(dir.path().join("rules.yml"))
        .arg("-m")
        .arg(dir.path().join("manifest.yml"))
        .arg("-t")
        .arg(dir.path().join("templates"))
        .arg("--cache-dir")
        .arg(dir.path().join("cache"))
        .assert()
        .success()
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("1.1"));

    assert_eq!(
        fs::read_to_string(dir.path().join("templates/manifest.yml")).unwrap(),
        "version: 1.1\n"
    );
}

#[test]
fn test_json_output_is_machine_readable() {
    let mut server = mockito::Server::new();
    mock_update_server(&mut server);

    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), &server.url());

    let output = flatup()
        .arg("-c")
        .arg(dir.path().join("rules.yml"))
        .arg("-m")
        .arg(dir.path().join("manifest.yml"))
        .arg("--cache-dir")
        .arg(dir.path().join("cache"))
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["changed"][0], "app");
    assert_eq!(value["resolved"][0]["version"], "1.1");
    assert_eq!(value["current"]["app"], "1.0");
    assert_eq!(value["dry_run"], false);
}

#[test]
fn test_dry_run_writes_nothing() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/downloads")
        .with_status(200)
        .with_body("app-1.1.tar.gz")
        .create();
    let artifact = server
        .mock("GET", "/files/app-1.1.tar.gz")
        .expect(0)
        .create();

    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), &server.url());

    flatup()
        .arg("-c")
        .arg(dir.path().join("rules.yml"))
        .arg("-m")
        .arg(dir.path().join("manifest.yml"))
        .arg("-t")
        .arg(dir.path().join("templates"))
        .arg("--cache-dir")
        .arg(dir.path().join("cache"))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    artifact.assert();
    assert!(!dir.path().join("templates/manifest.yml").exists());
    assert!(!dir.path().join("cache").exists());
}

#[test]
fn test_failing_descriptor_exits_with_partial_code() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/downloads")
        .with_status(500)
        .create();

    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), &server.url());

    flatup()
        .arg("-c")
        .arg(dir.path().join("rules.yml"))
        .arg("-m")
        .arg(dir.path().join("manifest.yml"))
        .arg("--cache-dir")
        .arg(dir.path().join("cache"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("app"));
}

#[test]
fn test_invalid_rule_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "rules.yml", "modules: [not a descriptor]\n");
    write(dir.path(), "manifest.yml", "modules: []\n");

    flatup()
        .arg("-c")
        .arg(dir.path().join("rules.yml"))
        .arg("-m")
        .arg(dir.path().join("manifest.yml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_help_describes_flags() {
    flatup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--no-cache"));
}
