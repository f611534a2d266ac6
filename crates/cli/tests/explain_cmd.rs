//! CLI tests for the `paramod explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn paramod_cmd() -> Command {
    Command::new(cargo::cargo_bin!("paramod"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = paramod_cmd()
        .args(["explain", "PM2101", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["code"], "PM2101");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = paramod_cmd()
        .args(["explain", "PM9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["code"], "PM9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = paramod_cmd()
        .args(["explain", "PM2101", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("PM2101") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}
