//! Overlay tree model and merge rules.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use thiserror::Error;

/// Children of a group, keyed by entry name.
///
/// A `BTreeMap` keeps iteration deterministic, which fixes the relative
/// order of matched option tiers and of every diagnostic a traversal emits.
pub type GroupMap<'a> = BTreeMap<Cow<'a, str>, OverlayNode<'a>>;

/// One node of the overlay database tree.
///
/// A node is either a scalar value or a group of named children, never
/// both; the variant split makes the illegal mixed state unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayNode<'a> {
    /// A scalar override value.
    Leaf(Cow<'a, str>),
    /// A named subtree.
    Group(GroupMap<'a>),
}

impl<'a> OverlayNode<'a> {
    /// The children of a group node.
    pub fn as_group(&self) -> Option<&GroupMap<'a>> {
        match self {
            OverlayNode::Group(children) => Some(children),
            OverlayNode::Leaf(_) => None,
        }
    }

    /// The value of a leaf node.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            OverlayNode::Leaf(value) => Some(value),
            OverlayNode::Group(_) => None,
        }
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            OverlayNode::Leaf(_) => 1,
            OverlayNode::Group(children) => children.values().map(OverlayNode::leaf_count).sum(),
        }
    }
}

impl Serialize for OverlayNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OverlayNode::Leaf(value) => serializer.serialize_str(value),
            OverlayNode::Group(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, child) in children {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
        }
    }
}

/// A key collision found while merging.
///
/// Every collision involving a leaf is a conflict, even when both sides
/// carry the same value; the database must not rely on silent dedup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting duplicate key '{path}'")]
pub struct MergeConflict {
    /// Slash-joined path from the merge root to the colliding key.
    pub path: String,
}

/// Merge `node` into `map` under `key`.
///
/// Group/group pairs merge recursively; any other pairing is a conflict.
pub fn merge_into<'a>(
    map: &mut GroupMap<'a>,
    key: Cow<'a, str>,
    node: OverlayNode<'a>,
) -> Result<(), MergeConflict> {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(node);
            Ok(())
        }
        Entry::Occupied(mut slot) => {
            let here = slot.key().to_string();
            match (slot.get_mut(), node) {
                (OverlayNode::Group(existing), OverlayNode::Group(incoming)) => {
                    for (child_key, child) in incoming {
                        merge_into(existing, child_key, child).map_err(|conflict| {
                            MergeConflict {
                                path: format!("{here}/{}", conflict.path),
                            }
                        })?;
                    }
                    Ok(())
                }
                _ => Err(MergeConflict { path: here }),
            }
        }
    }
}

/// A parsed overlay database.
///
/// The root behaves like an anonymous group; its entries are the machine
/// family groups. Built once per parse and read-only afterwards. Only
/// [`OverlayTree::merge`] ever extends it, before resolution starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OverlayTree<'a> {
    /// Top-level entries.
    pub root: GroupMap<'a>,
}

impl<'a> OverlayTree<'a> {
    /// Merge another database into this one, e.g. a site file on top of the
    /// factory file. Conflicts are fatal and name the full key path.
    pub fn merge(&mut self, other: OverlayTree<'a>) -> Result<(), MergeConflict> {
        for (key, node) in other.root {
            merge_into(&mut self.root, key, node)?;
        }
        Ok(())
    }

    /// Total number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.root.values().map(OverlayNode::leaf_count).sum()
    }
}
