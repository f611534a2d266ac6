//! Overlay selection for one machine.
//!
//! Walks the database tree and picks, in application order, every group of
//! fields that applies to a machine descriptor: the family's `common`
//! block, its `cut-bridge` and `algn-span` size groups, then any `+option`
//! blocks whose option the machine carries. Nothing here mutates a
//! parameter file; the merge step consumes the returned group list.

use crate::overlay::node::{GroupMap, OverlayNode, OverlayTree};
use paramod_descriptor::{Dimension, DimensionKind, MachineDescriptor};
use paramod_diagnostics::{Issue, IssueLog, codes};
use std::collections::BTreeMap;

/// Collect the field groups that apply to `machine`, in application order.
///
/// Order is fixed: `common` first, then `cut-bridge`, then `algn-span`,
/// then every matching `+option` block in name order. A later group wins
/// over an earlier one when both set the same field, which makes option
/// blocks the strongest tier.
///
/// An unknown machine id, a missing size group, or an unrecognized block
/// name logs an issue and resolution continues with what it has.
pub fn resolve_groups<'t, 'a>(
    tree: &'t OverlayTree<'a>,
    machine: &MachineDescriptor,
    issues: &mut IssueLog,
) -> Vec<&'t GroupMap<'a>> {
    let id = machine.family.id();
    let Some(OverlayNode::Group(family)) = tree.root.get(id) else {
        issues.push(Issue::new(
            codes::MACHINE_NOT_FOUND,
            format!("machine id '{id}' not found in overlay database"),
        ));
        return Vec::new();
    };

    let mut common = None;
    let mut cut_bridge = None;
    let mut align_span = None;
    let mut options = Vec::new();

    for (name, node) in family {
        let OverlayNode::Group(children) = node else {
            issues.push(Issue::new(
                codes::ORPHAN_FIELD,
                format!("field '{name}' directly under machine id '{id}' is ignored"),
            ));
            continue;
        };
        match name.as_ref() {
            "common" => common = Some(children),
            "cut-bridge" => {
                cut_bridge = lookup_dimension(
                    children,
                    DimensionKind::CutBridge,
                    machine.cut_bridge,
                    id,
                    issues,
                );
            }
            "algn-span" => {
                align_span = lookup_dimension(
                    children,
                    DimensionKind::AlignSpan,
                    machine.align_span,
                    id,
                    issues,
                );
            }
            name if name.starts_with('+') => {
                if machine.options.contains(&name[1..]) {
                    options.push(children);
                }
            }
            _ => {
                issues.push(Issue::new(
                    codes::UNRECOGNIZED_BLOCK,
                    format!("unrecognized block '{name}' under machine id '{id}'"),
                ));
            }
        }
    }

    [common, cut_bridge, align_span]
        .into_iter()
        .flatten()
        .chain(options)
        .collect()
}

/// Resolved groups regrouped per axis, for the axis file dialect.
///
/// Each selected group is expected to nest `axis: { field: value }`; a bare
/// field at group level has no axis to land in and is skipped with an
/// issue. Within one axis the groups keep [`resolve_groups`] order.
pub fn resolve_axis_map<'t, 'a>(
    tree: &'t OverlayTree<'a>,
    machine: &MachineDescriptor,
    issues: &mut IssueLog,
) -> BTreeMap<&'t str, Vec<&'t GroupMap<'a>>> {
    let mut map: BTreeMap<&'t str, Vec<&'t GroupMap<'a>>> = BTreeMap::new();
    for group in resolve_groups(tree, machine, issues) {
        for (axis, node) in group {
            match node {
                OverlayNode::Group(fields) => {
                    map.entry(axis.as_ref()).or_default().push(fields);
                }
                OverlayNode::Leaf(_) => {
                    issues.push(Issue::new(
                        codes::ORPHAN_FIELD,
                        format!("field '{axis}' outside an axis group is ignored"),
                    ));
                }
            }
        }
    }
    map
}

/// Pick the size group matching a machine dimension.
///
/// A machine without the dimension simply skips the tier. A missing size
/// key, or a bare field where a group should sit, logs an issue.
fn lookup_dimension<'t, 'a>(
    children: &'t GroupMap<'a>,
    kind: DimensionKind,
    dimension: Option<Dimension>,
    id: &str,
    issues: &mut IssueLog,
) -> Option<&'t GroupMap<'a>> {
    let dimension = dimension?;
    let key = dimension.to_string();
    match children.get(key.as_str()) {
        Some(OverlayNode::Group(fields)) => Some(fields),
        Some(OverlayNode::Leaf(_)) => {
            issues.push(Issue::new(
                codes::ORPHAN_FIELD,
                format!("field '{key}' under '{kind}' is ignored"),
            ));
            None
        }
        None => {
            issues.push(Issue::new(
                codes::DIMENSION_NOT_FOUND,
                format!("{kind} '{key}' not found for machine id '{id}'"),
            ));
            None
        }
    }
}
