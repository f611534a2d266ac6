//! Issue code constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Codes are grouped by the stage that raises them:
//! `PM11xx` file structure, `PM21xx` overlay resolution, `PM31xx` merge,
//! `PM41xx` migration.

// ── File structure (PM11xx) ──────────────────────────────────────────────

/// Duplicate variable name inside one axis block; the first occurrence wins.
pub const DUPLICATE_FIELD: &str = "PM1101";
/// Duplicate label in a flat parameter file; the first occurrence wins.
pub const DUPLICATE_LABEL: &str = "PM1102";
/// Flat-dialect assignment without a trailing quoted label; the field is
/// parsed but cannot be addressed by overlays.
pub const UNLABELED_VARIABLE: &str = "PM1103";
/// Assignment line outside any axis block in a block-dialect file.
pub const STRAY_ASSIGNMENT: &str = "PM1104";
/// Tag other than the matching end-tag appearing inside an open block.
pub const STRAY_TAG: &str = "PM1105";
/// Axis block closed without a `Name` field; its fields cannot be addressed.
pub const BLOCK_WITHOUT_NAME: &str = "PM1106";
/// Axis block closed without any fields.
pub const EMPTY_BLOCK: &str = "PM1107";
/// Two axis blocks share the same `Name`; the first block wins.
pub const DUPLICATE_BLOCK: &str = "PM1108";
/// Line that opens like a tag but does not parse as `[Identifier]`.
pub const MALFORMED_TAG: &str = "PM1109";
/// Flat-dialect line that is neither assignment, tag, comment, nor blank.
pub const UNPARSED_LINE: &str = "PM1110";

// ── Overlay resolution (PM21xx) ──────────────────────────────────────────

/// The database has no group for the machine's family id.
pub const MACHINE_NOT_FOUND: &str = "PM2101";
/// A dimension group exists but has no entry for the machine's size.
pub const DIMENSION_NOT_FOUND: &str = "PM2102";
/// A scalar value sits where a group is required and is ignored.
pub const ORPHAN_FIELD: &str = "PM2103";
/// A family subgroup name is neither reserved nor a matched `+option`.
pub const UNRECOGNIZED_BLOCK: &str = "PM2104";

// ── Merge (PM31xx) ───────────────────────────────────────────────────────

/// An overlay entry is a group where a scalar value was expected.
pub const VALUE_LESS_FIELD: &str = "PM3101";
/// An overlay value targets a parameter the file does not contain.
pub const PARAM_NOT_FOUND: &str = "PM3102";
/// An overlay addresses an axis the file has no block for.
pub const AXIS_NOT_FOUND: &str = "PM3103";

// ── Migration (PM41xx) ───────────────────────────────────────────────────

/// A field was matched across versions by the rename heuristic; the carried
/// value should be verified by hand.
pub const RENAMED: &str = "PM4101";
/// An old-file field has no counterpart in the new template.
pub const MISSING_IN_TARGET: &str = "PM4102";
