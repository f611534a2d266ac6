//! File-to-file migration with fuzzy rename detection.
//!
//! Migration carries the values of an old parameter file into a new
//! template of the same machine. Fields still present under the same
//! label are copied directly; for the rest, a renamed counterpart is
//! searched among the template's fields. A candidate with the identical
//! variable name qualifies on description similarity alone; a candidate
//! at a different register address must also sit close by, carry the
//! textually identical value, and clear a similarity bar that tightens
//! with the address distance. Everything here is best-effort and
//! non-fatal: a field with no counterpart just logs an issue.

/// Register-address parsing for rename candidates.
pub mod register;

use crate::paramfile::{Field, FieldId, ParamFile};
use paramod_diagnostics::{Issue, IssueLog, codes};
use register::Register;
use std::collections::BTreeMap;

pub use register::RegisterClass;

/// Description-similarity score every rename must beat.
pub const RENAME_SIMILARITY_FLOOR: f64 = 0.7;
/// Register-index distance at and beyond which no rename is accepted.
pub const RENAME_DISTANCE_CEILING: u64 = 20;
/// Length of the description prefix that must match exactly.
pub const RENAME_PREFIX_LEN: usize = 3;

/// Similarity a register rename at `distance` must exceed.
///
/// [`RENAME_SIMILARITY_FLOOR`] for an adjacent register, rising
/// quadratically to 1.0 at [`RENAME_DISTANCE_CEILING`] so far-away
/// candidates need a near-verbatim description.
pub fn similarity_threshold(distance: u64) -> f64 {
    let t = distance as f64 / RENAME_DISTANCE_CEILING as f64;
    RENAME_SIMILARITY_FLOOR + (1.0 - RENAME_SIMILARITY_FLOOR) * t * t
}

/// Carry `old`'s values into `template`, detecting renamed fields.
///
/// Both files must be the flat dialect. Returns the number of distinct
/// template fields that changed; a carried value equal to the template's
/// own leaves the line untouched.
pub fn migrate(old: &ParamFile<'_>, template: &mut ParamFile<'_>, issues: &mut IssueLog) -> usize {
    let mut planned: Vec<(FieldId, String)> = Vec::new();

    {
        let fields = template.fields();
        // First template field per variable name, for the same-var branch.
        let mut var_index: BTreeMap<&str, FieldId> = BTreeMap::new();
        for (id, field) in fields.iter().enumerate() {
            var_index.entry(field.var.as_ref()).or_insert(id);
        }

        for old_field in old.fields() {
            if let Some(label) = old_field.label.as_deref()
                && let Some(id) = template.lookup_label(label)
            {
                if fields[id].value != old_field.value {
                    planned.push((id, old_field.value.as_ref().to_owned()));
                }
                continue;
            }
            match find_rename(old_field, fields, &var_index) {
                Some(id) => {
                    if fields[id].value != old_field.value {
                        planned.push((id, old_field.value.as_ref().to_owned()));
                    }
                    issues.push(Issue::new(
                        codes::RENAMED,
                        format!(
                            "Renamed '{}' to '{}' (verify)",
                            display_name(old_field),
                            display_name(&fields[id]),
                        ),
                    ));
                }
                None => {
                    issues.push(Issue::new(
                        codes::MISSING_IN_TARGET,
                        format!(
                            "'{}' not found in target (removed or renamed)",
                            display_name(old_field),
                        ),
                    ));
                }
            }
        }
    }

    let mut modified = 0;
    for (id, value) in planned {
        if template.set_override(id, value) {
            modified += 1;
        }
    }
    modified
}

/// Find the template field `old_field` was renamed to, if any.
fn find_rename(
    old_field: &Field<'_>,
    fields: &[Field<'_>],
    var_index: &BTreeMap<&str, FieldId>,
) -> Option<FieldId> {
    // Same variable name, different label: the label was reworded.
    if let Some(&id) = var_index.get(old_field.var.as_ref())
        && descriptions_allow(old_field, &fields[id], RENAME_SIMILARITY_FLOOR)
    {
        return Some(id);
    }

    // Different register address of the same class, close by, with the
    // identical value. Best similarity wins, nearer address on a tie.
    let old_reg = Register::parse(&old_field.var)?;
    let old_desc = description(old_field);
    let mut best: Option<(f64, u64, FieldId)> = None;
    for (id, candidate) in fields.iter().enumerate() {
        if candidate.var == old_field.var {
            continue;
        }
        let Some(reg) = Register::parse(&candidate.var) else {
            continue;
        };
        let Some(distance) = old_reg.distance(reg) else {
            continue;
        };
        if distance >= RENAME_DISTANCE_CEILING || candidate.value != old_field.value {
            continue;
        }
        let candidate_desc = description(candidate);
        if !prefixes_match(old_desc, candidate_desc) {
            continue;
        }
        let similarity = description_similarity(old_desc, candidate_desc);
        if similarity <= similarity_threshold(distance) {
            continue;
        }
        if best.is_none_or(|(s, d, _)| similarity > s || (similarity == s && distance < d)) {
            best = Some((similarity, distance, id));
        }
    }
    best.map(|(_, _, id)| id)
}

fn descriptions_allow(old_field: &Field<'_>, candidate: &Field<'_>, threshold: f64) -> bool {
    let old_desc = description(old_field);
    let candidate_desc = description(candidate);
    prefixes_match(old_desc, candidate_desc)
        && description_similarity(old_desc, candidate_desc) > threshold
}

fn description<'f>(field: &'f Field<'_>) -> &'f str {
    field.comment.as_deref().unwrap_or("")
}

/// Case-folded bigram similarity of two descriptions.
fn description_similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(&a.to_lowercase(), &b.to_lowercase())
}

/// Both descriptions start with the same [`RENAME_PREFIX_LEN`] characters.
fn prefixes_match(a: &str, b: &str) -> bool {
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    for _ in 0..RENAME_PREFIX_LEN {
        match (a_chars.next(), b_chars.next()) {
            (Some(x), Some(y)) if x == y => {}
            _ => return false,
        }
    }
    true
}

/// A field's label when it has one, its variable name otherwise.
fn display_name<'f>(field: &'f Field<'_>) -> &'f str {
    field.label.as_deref().unwrap_or(&field.var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_rises_from_floor_to_one() {
        assert!((similarity_threshold(0) - 0.7).abs() < 1e-9);
        assert!((similarity_threshold(5) - 0.71875).abs() < 1e-9);
        assert!((similarity_threshold(20) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_admits_the_near_pin_and_blocks_the_far_one() {
        // Distance 5 with similarity 0.75 is a rename.
        assert!(0.75 > similarity_threshold(5));
        // Distance 25 is past the ceiling, and 0.72 would fail anyway.
        assert!(25 >= RENAME_DISTANCE_CEILING);
        assert!(0.72 < similarity_threshold(19));
    }

    #[test]
    fn prefix_needs_three_identical_characters() {
        assert!(prefixes_match("max speed", "max accel"));
        assert!(!prefixes_match("max speed", "Max speed"));
        assert!(!prefixes_match("ab", "ab"));
        assert!(!prefixes_match("", "max"));
    }

    #[test]
    fn similarity_is_case_folded() {
        let a = "Maximum axis speed";
        let b = "MAXIMUM AXIS SPEED";
        assert!((description_similarity(a, b) - 1.0).abs() < 1e-9);
    }
}
