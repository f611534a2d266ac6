//! CLI tests for the `paramod migrate` subcommand.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

/// Previous-version flat file: one changed value, one identical value, and
/// one field whose label was reworded in the new template.
const OLD_FILE: &str = "\
NB100 = 2 # head count 'HeadCount'
ND100 = 750 # max speed x 'SpeedX'
NB101 = 1 # second head 'HeadTwo'
";

/// New-version template with the same variables; `NB101` was relabeled.
const TEMPLATE: &str = "\
NB100 = 1 # head count 'HeadCount'
ND100 = 750 # max speed x 'SpeedX'
NB101 = 0 # second head 'SecondHead'
";

fn paramod_cmd() -> Command {
    Command::new(cargo::cargo_bin!("paramod"))
}

fn write_pair(old: &str, template: &str) -> (tempfile::TempDir, String, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let old_path = dir.path().join("v1.cfg");
    let template_path = dir.path().join("v2.cfg");
    fs::write(&old_path, old).expect("write old file");
    fs::write(&template_path, template).expect("write template");
    (
        dir,
        old_path.to_string_lossy().to_string(),
        template_path.to_string_lossy().to_string(),
    )
}

#[test]
fn migrate_carries_changed_values_and_detects_the_rename() {
    let (_dir, old, template) = write_pair(OLD_FILE, TEMPLATE);
    let output = paramod_cmd()
        .args(["migrate", &old, &template, "--output", "json"])
        .output()
        .expect("run migrate command");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json envelope");
    assert_eq!(json["modified"], 2, "changed value + renamed field");
    assert_eq!(json["issues"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["issues"][0]["code"], "PM4101");

    let text = json["text"].as_str().expect("migrated text in envelope");
    assert!(text.contains("NB100 = 2 # head count 'HeadCount'"));
    assert!(
        text.contains("NB101 = 1 # second head 'SecondHead'"),
        "renamed field keeps the template label, carries the old value"
    );
    assert!(
        text.contains("ND100 = 750 # max speed x 'SpeedX'"),
        "identical values replay untouched"
    );
}

#[test]
fn migrate_reports_fields_with_no_counterpart() {
    let old = "NB100 = 1 # head count 'HeadCount'\nZZ1 = 5 # oddball 'Odd'\n";
    let template = "NB100 = 1 # head count 'HeadCount'\n";
    let (_dir, old, template) = write_pair(old, template);

    let output = paramod_cmd()
        .args(["migrate", &old, &template, "--output", "json"])
        .output()
        .expect("run migrate command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json envelope");
    assert_eq!(json["modified"], 0);
    assert_eq!(json["issues"][0]["code"], "PM4102");
    assert!(
        json["issues"][0]["message"]
            .as_str()
            .is_some_and(|m| m.contains("Odd")),
        "unexpected message: {}",
        json["issues"][0]["message"]
    );
}

#[test]
fn migrate_write_replaces_the_template_and_keeps_a_backup() {
    let (_dir, old, template) = write_pair(OLD_FILE, TEMPLATE);
    let output = paramod_cmd()
        .args(["migrate", &old, &template, "--write", "--output", "json"])
        .output()
        .expect("run migrate command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json envelope");
    assert_eq!(json["written"].as_str(), Some(template.as_str()));

    let migrated = fs::read_to_string(&template).expect("read migrated file");
    assert!(migrated.contains("NB100 = 2"));
    let backup = fs::read_to_string(format!("{template}.bak")).expect("read backup");
    assert_eq!(backup, TEMPLATE, "backup must hold the original template");
}

#[test]
fn migrate_diff_launches_on_the_written_output() {
    let (dir, old, template) = write_pair(OLD_FILE, TEMPLATE);
    let out = dir.path().join("migrated.cfg").to_string_lossy().to_string();
    let output = paramod_cmd()
        .args([
            "migrate", &old, &template, "--out", &out, "--diff", "true", "--output", "json",
        ])
        .output()
        .expect("run migrate command");

    assert!(
        output.status.success(),
        "the diff tool's exit status must not fail the run; stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        fs::read_to_string(&out)
            .expect("read --out file")
            .contains("NB100 = 2")
    );
}

#[test]
fn migrate_strict_exits_nonzero_on_issues() {
    let (_dir, old, template) = write_pair(OLD_FILE, TEMPLATE);
    let output = paramod_cmd()
        .args(["migrate", &old, &template, "--strict", "--output", "json"])
        .output()
        .expect("run migrate command");

    // The rename is an issue, so --strict turns this run into a failure.
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("envelope is still printed");
    assert_eq!(json["issues"][0]["code"], "PM4101");
}
