//! Shared fixtures and helpers for `paramod_core` integration tests.

#![allow(unreachable_pub)]

use paramod_core::paramfile::{Dialect, ParamFile};
use paramod_core::{OverlayTree, parse_overlay, parse_param_file};
use paramod_descriptor::MachineDescriptor;
use paramod_diagnostics::IssueLog;

/// Axis-dialect target file used by the resolution and round-trip tests.
#[allow(dead_code)]
pub const AXIS_FILE: &str = "\
# Machine parameter file
[StartNote]
machine setup notes
do not edit by hand
[EndNote]
[StartXrAxis]
Name = Xr
MaxPos = 3000
MinPos = 0
InvDir = 0
AxEnabled = 1
[EndXrAxis]
[StartXsAxis]
Name = Xs
MaxPos = 2500
InvDir = 0
[EndXsAxis]
[StartYsupAxis]
Name = Ysup
MaxPos = 1600
InvDir = 0
[EndYsupAxis]
[StartYinfAxis]
Name = Yinf
MaxPos = 1600
InvDir = 0
[EndYinfAxis]
[StartCoAxis]
Name = Co
AxEnabled = 0
MaxSpeed = 40
[EndCoAxis]
[StartSleAxis]
Name = Sle
AxEnabled = 0
[EndSleAxis]
";

/// Overlay database matching [`AXIS_FILE`] for machine
/// `HP*6.0*4.6*(opp,other)` with no issues.
#[allow(dead_code)]
pub const AXIS_DATABASE: &str = "\
// hp family overlays
hp: {
    common: {
        Xr: { InvDir: 0 }
        Co: { MaxSpeed: 40 }
    }
    cut-bridge: {
        3.2: { Xr: { MaxPos: 1700 } }
        6.0: {
            Xr: { MaxPos: 3100 }
            Xs: { MaxPos: 2600 }
        }
        6.7: { Xr: { MaxPos: 3400 } }
    }
    algn-span: {
        4.6: {
            Ysup: { MaxPos: 1700 }
            Yinf: { MaxPos: 1700 }
        }
        5.2: { Ysup: { MaxPos: 1900 } }
    }
    +opp: {
        Ysup: { InvDir: 1 }
    }
    +other: {
        Co: { AxEnabled: 1 }
        Sle: { AxEnabled: 1 }
    }
}
jet: {
    common: {
        Xr: { MaxPos: 9999 }
    }
}
";

/// Parse an overlay database, panicking on structural errors.
#[allow(dead_code)]
pub fn overlay(input: &str) -> OverlayTree<'_> {
    parse_overlay(input.as_bytes(), "db.txt").expect("overlay fixture must parse")
}

/// Parse a parameter file, asserting it produced no issues.
#[allow(dead_code)]
pub fn clean_file(input: &str, dialect: Dialect) -> ParamFile<'_> {
    let mut issues = IssueLog::new();
    let file = parse_param_file(input.as_bytes(), "machine.cfg", dialect, &mut issues)
        .expect("file fixture must parse");
    assert!(
        issues.is_empty(),
        "fixture should parse without issues, got: {:?}",
        codes_of(&issues)
    );
    file
}

/// Parse a parameter file, returning the file and whatever issues it logged.
#[allow(dead_code)]
pub fn file_with_issues(input: &str, dialect: Dialect) -> (ParamFile<'_>, IssueLog) {
    let mut issues = IssueLog::new();
    let file = parse_param_file(input.as_bytes(), "machine.cfg", dialect, &mut issues)
        .expect("file fixture must parse");
    (file, issues)
}

/// Parse a machine descriptor, panicking on errors.
#[allow(dead_code)]
pub fn machine(input: &str) -> MachineDescriptor {
    MachineDescriptor::parse(input).expect("descriptor fixture must parse")
}

/// Issue codes in log order.
#[allow(dead_code)]
pub fn codes_of(issues: &IssueLog) -> Vec<String> {
    issues.iter().map(|issue| issue.code.to_string()).collect()
}

/// Assert the log contains exactly one issue with `code`.
#[allow(dead_code)]
pub fn assert_single_issue(issues: &IssueLog, code: &str) {
    assert_eq!(
        codes_of(issues),
        vec![code.to_string()],
        "expected exactly one {code} issue"
    );
}
