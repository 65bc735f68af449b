//! Binary-level CLI tests
//!
//! None of these reach the internet: they either fail before any network
//! activity or use a local catalog server.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command running in an empty directory with no `AWSPING_*` overrides
fn awsping(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("awsping").unwrap();
    cmd.current_dir(dir.path());
    for var in [
        "AWSPING_REPEATS",
        "AWSPING_SERVICE",
        "AWSPING_TIMEOUT",
        "AWSPING_CATALOG_URL",
        "AWSPING_ENABLE_COLOR",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--repeats"))
        .stdout(predicate::str::contains("--https"))
        .stdout(predicate::str::contains("--list-only"));
}

#[test]
fn test_long_help_lists_environment_variables() {
    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported Environment Variables"))
        .stdout(predicate::str::contains("AWSPING_REPEATS"))
        .stdout(predicate::str::contains("AWSPING_ENABLE_COLOR"));
}

#[test]
fn test_version_includes_build_info() {
    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("built"));
}

#[test]
fn test_invalid_argument_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    for args in [
        vec!["--repeats", "0"],
        vec!["--repeats", "lots"],
        vec!["--verbose", "3"],
        vec!["--timeout", "0"],
    ] {
        awsping(&dir).args(&args).assert().failure();
    }
}

#[test]
fn test_conflicting_color_flags() {
    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .args(["--color", "--no-color"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot specify both --color and --no-color"));
}

#[test]
fn test_list_only_with_verbose_is_rejected() {
    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .args(["--list-only", "--verbose", "1", "--no-color"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--list-only"));
}

#[test]
fn test_invalid_env_value_fails_before_probing() {
    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .env("AWSPING_REPEATS", "0")
        .arg("--no-color")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"));
}

#[test]
fn test_env_file_is_read_from_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "AWSPING_SERVICE=not/a/label\n").unwrap();

    awsping(&dir)
        .arg("--no-color")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid service name"));
}

#[test]
fn test_unreachable_catalog_exits_with_catalog_code() {
    let dir = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/regions.json", listener.local_addr().unwrap());
    drop(listener);

    awsping(&dir)
        .args(["--list-only", "--no-color", "--timeout", "2", "--catalog-url", &url])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("[CATALOG]"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_only_prints_sorted_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"us-west-2": "US West (Oregon)", "af-south-1": "Africa (Cape Town)"}"#),
        )
        .mount(&server)
        .await;
    let url = format!("{}/regions.json", server.uri());

    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .args(["--list-only", "--no-color", "--catalog-url", &url])
        .assert()
        .success()
        .stdout("af-south-1      Africa (Cape Town)\nus-west-2       US West (Oregon)\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bad_catalog_body_exits_with_catalog_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    let url = format!("{}/regions.json", server.uri());

    let dir = TempDir::new().unwrap();
    awsping(&dir)
        .args(["--list-only", "--no-color", "--catalog-url", &url])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Region catalog is empty"));
}
