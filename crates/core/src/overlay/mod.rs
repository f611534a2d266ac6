//! Overlay database: tree model, parser, and per-machine resolution.

/// Tree model and conflict-checked merging.
pub mod node;
/// Parser for the nested block format.
pub mod parser;
/// Group selection for a machine descriptor.
pub mod resolve;

pub use node::{GroupMap, MergeConflict, OverlayNode, OverlayTree, merge_into};
pub use parser::parse_overlay;
pub use resolve::{resolve_axis_map, resolve_groups};
