#![allow(clippy::unwrap_used)]
// End-to-end binary tests. Environment variables are stripped so results
// do not depend on the developer's shell.

use assert_cmd::Command;
use predicates::prelude::*;

fn postal_cli() -> Command {
    let mut cmd = Command::cargo_bin("postal-cli").unwrap();
    cmd.env_remove("POSTAL_URL")
        .env_remove("POSTAL_API_KEY")
        .env_remove("POSTAL_TIMEOUT");
    cmd
}

#[test]
fn missing_url_fails_with_guidance() {
    postal_cli()
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("POSTAL_URL"));
}

#[test]
fn missing_api_key_fails_with_guidance() {
    postal_cli()
        .arg("--url")
        .arg("https://postal.test")
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("POSTAL_API_KEY"));
}

#[test]
fn unreachable_service_fails_before_the_menu() {
    // Port 9 is discard; nothing listens there in the test environment.
    postal_cli()
        .args(["-u", "http://127.0.0.1:9", "-k", "test-key", "--timeout", "2"])
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not connect"));
}

#[test]
fn help_documents_the_flags() {
    postal_cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--url")
                .and(predicate::str::contains("--api-key"))
                .and(predicate::str::contains("--quick-add")),
        );
}

#[test]
fn version_flag_prints_version() {
    postal_cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("postal-cli"));
}

#[tokio::test]
async fn interrupt_exits_cleanly_with_code_zero() {
    use std::process::Stdio;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/management/api/v1/system/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "success", "data": {} })),
        )
        .mount(&server)
        .await;

    // Keep stdin open so the menu sits waiting for input instead of
    // leaving on EOF; the signal has to be what ends the process.
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("postal-cli"))
        .args(["-u", &server.uri(), "-k", "test-key"])
        .env_remove("POSTAL_URL")
        .env_remove("POSTAL_API_KEY")
        .env_remove("POSTAL_TIMEOUT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Let the process install its signal handler and reach the menu.
    tokio::time::sleep(Duration::from_millis(800)).await;

    let kill = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Interrupted"),
        "expected interrupt message, got: {stdout}"
    );
}
