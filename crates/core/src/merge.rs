//! Applying resolved overlay groups onto a parsed file.
//!
//! Groups arrive in tier order and later tiers simply overwrite earlier
//! ones on a colliding key. The returned count is the number of distinct
//! fields that now carry an override, so hitting one field from three
//! tiers still counts once.

use crate::overlay::{GroupMap, OverlayNode};
use crate::paramfile::ParamFile;
use paramod_diagnostics::{Issue, IssueLog, codes};
use std::collections::BTreeMap;

/// Apply a flat group list to a label-indexed file.
///
/// Every leaf entry overrides the field whose label matches its key; a
/// group where a leaf should sit, or a key with no matching field, logs
/// an issue and is skipped.
pub fn apply_groups(
    file: &mut ParamFile<'_>,
    groups: &[&GroupMap<'_>],
    issues: &mut IssueLog,
) -> usize {
    let mut modified = 0;
    for group in groups {
        for (key, node) in *group {
            let OverlayNode::Leaf(value) = node else {
                issues.push(Issue::new(
                    codes::VALUE_LESS_FIELD,
                    format!("field '{key}' hasn't a value"),
                ));
                continue;
            };
            match file.lookup_label(key) {
                Some(id) => {
                    if file.set_override(id, value.as_ref()) {
                        modified += 1;
                    }
                }
                None => {
                    issues.push(Issue::new(
                        codes::PARAM_NOT_FOUND,
                        format!("parameter '{key}' not found (value '{value}' not applied)"),
                    ));
                }
            }
        }
    }
    modified
}

/// Apply an axis-keyed group map to an axis-dialect file.
///
/// Same rules as [`apply_groups`], with fields addressed by axis and
/// variable name. An axis the target file does not have skips all of its
/// groups with a single issue.
pub fn apply_axis_map(
    file: &mut ParamFile<'_>,
    map: &BTreeMap<&str, Vec<&GroupMap<'_>>>,
    issues: &mut IssueLog,
) -> usize {
    let mut modified = 0;
    for (axis, groups) in map {
        if !file.axes().contains_key(*axis) {
            issues.push(Issue::new(
                codes::AXIS_NOT_FOUND,
                format!("axis '{axis}' not found in target file"),
            ));
            continue;
        }
        for group in groups {
            for (var, node) in *group {
                let OverlayNode::Leaf(value) = node else {
                    issues.push(Issue::new(
                        codes::VALUE_LESS_FIELD,
                        format!("field '{axis}.{var}' hasn't a value"),
                    ));
                    continue;
                };
                match file.lookup_axis_field(axis, var) {
                    Some(id) => {
                        if file.set_override(id, value.as_ref()) {
                            modified += 1;
                        }
                    }
                    None => {
                        issues.push(Issue::new(
                            codes::PARAM_NOT_FOUND,
                            format!(
                                "parameter '{axis}.{var}' not found (value '{value}' not applied)"
                            ),
                        ));
                    }
                }
            }
        }
    }
    modified
}
