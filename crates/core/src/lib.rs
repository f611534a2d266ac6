//! Parameter-overlay resolution engine.
//!
//! Adapts text-based machine-parameter files by overlaying values from a
//! machine-descriptor-keyed overlay database, and migrates a parameter
//! file forward across schema versions with fuzzy rename detection. The
//! main entry points are [`parse_overlay`] and [`parse_param_file`] for
//! parsing, [`resolve_groups`]/[`resolve_axis_map`] for overlay selection,
//! [`apply_groups`]/[`apply_axis_map`] for the merge, and
//! [`write_param_file`] for byte-faithful output.

#![warn(missing_docs)]

/// Fatal parse errors with file, line, and offset.
pub mod error;
/// Byte classification and the zero-copy scanner.
pub mod scan;
/// Overlay database: tree model, parser, resolution.
pub mod overlay;
/// Parameter files: line model, dialect parsers, writer.
pub mod paramfile;
/// Overlay-group application onto a parsed file.
pub mod merge;
/// Schema migration with rename detection.
pub mod migrate;
/// Serializable views for JSON output.
pub mod dump;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Errors
pub use error::{ParseError, ParseErrorKind};

// Overlay database
pub use overlay::{GroupMap, OverlayNode, OverlayTree, parse_overlay};
pub use overlay::{resolve_axis_map, resolve_groups};

// Parameter files
pub use paramfile::{Dialect, ParamFile, parse_param_file};
pub use paramfile::{Provenance, write_param_file};

// Merge and migration
pub use merge::{apply_axis_map, apply_groups};
pub use migrate::migrate;

// Serialization helpers
pub use dump::{FileSummary, summarize, to_pretty_json};
