//! CLI tests for the `paramod resolve` subcommand.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

const AXIS_DATABASE: &str = "\
hp: {
    common: {
        Xr: { InvDir: 0 }
        Co: { MaxSpeed: 40 }
    }
    cut-bridge: {
        6.0: {
            Xr: { MaxPos: 3100 }
            Xs: { MaxPos: 2600 }
        }
    }
    algn-span: {
        4.6: {
            Ysup: { MaxPos: 1700 }
            Yinf: { MaxPos: 1700 }
        }
    }
    +opp: {
        Ysup: { InvDir: 1 }
    }
    +other: {
        Co: { AxEnabled: 1 }
        Sle: { AxEnabled: 1 }
    }
}
";

fn paramod_cmd() -> Command {
    Command::new(cargo::cargo_bin!("paramod"))
}

fn write_database() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("machines.ovl");
    fs::write(&db, AXIS_DATABASE).expect("write overlay database");
    (dir, db.to_string_lossy().to_string())
}

#[test]
fn resolve_lists_groups_in_tier_order() {
    let (_dir, db) = write_database();
    let output = paramod_cmd()
        .args([
            "resolve",
            "--machine",
            "HP*6.0*4.6*(opp,other)",
            "--database",
            &db,
            "--output",
            "json",
        ])
        .output()
        .expect("run resolve command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json envelope");
    assert_eq!(json["machine"], "hp-6.0/4.6-(opp,other)");

    let groups = json["groups"].as_array().expect("groups array");
    assert_eq!(groups.len(), 5, "common, cut, algn, +opp, +other");
    assert_eq!(groups[0]["Xr"]["InvDir"], "0", "common comes first");
    assert_eq!(groups[1]["Xr"]["MaxPos"], "3100", "then the cut-bridge tier");
    assert_eq!(groups[3]["Ysup"]["InvDir"], "1", "options come last");
    assert_eq!(json["issues"].as_array().map(Vec::len), Some(0));
}

#[test]
fn resolve_axes_regroups_per_axis() {
    let (_dir, db) = write_database();
    let output = paramod_cmd()
        .args([
            "resolve",
            "--machine",
            "HP*6.0*4.6*(opp,other)",
            "--database",
            &db,
            "--axes",
            "--output",
            "json",
        ])
        .output()
        .expect("run resolve command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json envelope");

    let ysup = json["axes"]["Ysup"].as_array().expect("Ysup groups");
    assert_eq!(ysup.len(), 2, "algn-span tier and +opp tier");
    assert_eq!(ysup[0]["MaxPos"], "1700");
    assert_eq!(ysup[1]["InvDir"], "1", "option tier stays last within the axis");

    let xr = json["axes"]["Xr"].as_array().expect("Xr groups");
    assert_eq!(xr.len(), 2);
}

#[test]
fn resolve_unknown_machine_reports_the_issue() {
    let (_dir, db) = write_database();
    let output = paramod_cmd()
        .args([
            "resolve", "--machine", "float", "--database", &db, "--output", "json",
        ])
        .output()
        .expect("run resolve command");

    assert!(output.status.success(), "issues alone must not fail");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json envelope");
    assert_eq!(json["groups"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["issues"][0]["code"], "PM2101");
}

#[test]
fn resolve_pretty_prints_the_groups_to_stdout() {
    let (_dir, db) = write_database();
    let output = paramod_cmd()
        .args([
            "resolve",
            "--machine",
            "HP*6.0*4.6*(opp,other)",
            "--database",
            &db,
            "--output",
            "pretty",
        ])
        .output()
        .expect("run resolve command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.trim_start().starts_with('['),
        "pretty mode prints the group list itself"
    );
    assert!(stdout.contains("\"MaxPos\": \"3100\""));
}
