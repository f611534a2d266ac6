//! Diagnostics for the paramod toolkit.
//!
//! Provides [`Issue`] and [`IssueLog`], the non-fatal reporting channel used
//! by overlay resolution, merging, and migration. Fatal parse errors are a
//! separate typed-error channel owned by the parsing crates; everything that
//! does not abort a run lands here instead. Issue codes are defined in the
//! [`codes`] module.

#![warn(missing_docs)]

/// Issue code constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// ── Issue ────────────────────────────────────────────────────────────────

/// A non-fatal diagnostic produced while resolving, merging, or migrating.
///
/// Issues never stop a run. They accumulate in an [`IssueLog`] and are
/// rendered at the end: on the console, in JSON output, and as comment
/// lines injected into the written parameter file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable issue code (e.g. `"PM2101"`).
    pub code: Cow<'static, str>,
    /// Human-readable message.
    pub message: String,
    /// 1-based line in the relevant source file, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Issue {
    /// Create an issue with no source line.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Attach a 1-based source line (builder pattern).
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns the long-form explanation for this issue's code, if known.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.code)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

// ── IssueLog ─────────────────────────────────────────────────────────────

/// Append-only collection of [`Issue`]s for one run.
///
/// One log is threaded through parse, resolve, and merge so the caller sees
/// every problem in the order it was found. Entries are never removed or
/// reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueLog {
    issues: Vec<Issue>,
}

impl IssueLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Number of issues recorded so far.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// True when no issue has been recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Iterate over the recorded issues in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    /// View the recorded issues as a slice.
    pub fn as_slice(&self) -> &[Issue] {
        &self.issues
    }
}

impl<'a> IntoIterator for &'a IssueLog {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl IntoIterator for IssueLog {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

// ── Explanations ─────────────────────────────────────────────────────────

/// Returns the long-form explanation for an issue code, if known.
pub fn explain(code: &str) -> Option<&'static str> {
    Some(match code {
        codes::DUPLICATE_FIELD => {
            "A variable name appears more than once inside the same axis \
             block. Only the first occurrence is indexed; later ones are \
             kept as text but cannot be targeted by overlays."
        }
        codes::DUPLICATE_LABEL => {
            "Two lines in a flat parameter file carry the same quoted label. \
             Labels are the lookup keys for overlays and migration, so only \
             the first occurrence is addressable."
        }
        codes::UNLABELED_VARIABLE => {
            "A flat-dialect assignment has no trailing 'Label' token in its \
             comment. The line is preserved verbatim but no overlay or \
             migration step can address it."
        }
        codes::STRAY_ASSIGNMENT => {
            "An assignment appears outside any axis block in a block-dialect \
             file. It is preserved verbatim but belongs to no axis and is \
             not indexed."
        }
        codes::STRAY_TAG => {
            "A tag other than the matching end-tag appears inside an open \
             axis block. The tag is ignored and the block stays open."
        }
        codes::BLOCK_WITHOUT_NAME => {
            "An axis block closed without a Name field. Its fields were \
             parsed but the block cannot be addressed by axis id."
        }
        codes::EMPTY_BLOCK => {
            "An axis block closed without a single assignment between its \
             start and end tags."
        }
        codes::DUPLICATE_BLOCK => {
            "Two axis blocks resolved to the same Name. The first block \
             keeps the identity; the second is preserved as text only."
        }
        codes::MALFORMED_TAG => {
            "A line opens with '[' but does not parse as a tag of the form \
             [Identifier] with nothing else on the line. The line is \
             treated as opaque text."
        }
        codes::UNPARSED_LINE => {
            "A flat-dialect line is neither an assignment, a tag, a comment, \
             nor blank. It is preserved verbatim and otherwise ignored."
        }
        codes::MACHINE_NOT_FOUND => {
            "The overlay database has no top-level group named after the \
             machine's family id, so resolution produced no overlay groups."
        }
        codes::DIMENSION_NOT_FOUND => {
            "A cut-bridge or algn-span group exists for this family, but it \
             has no entry keyed by the machine's dimension. That tier is \
             skipped."
        }
        codes::ORPHAN_FIELD => {
            "A scalar value sits directly where a group is required (for \
             example a field directly under a family, or under an axis \
             grouping). It is ignored."
        }
        codes::UNRECOGNIZED_BLOCK => {
            "A family subgroup is neither 'common', a dimension group, nor a \
             '+option' matched by the machine descriptor. It is skipped."
        }
        codes::VALUE_LESS_FIELD => {
            "An overlay entry that should carry a scalar value is itself a \
             group. The entry is skipped."
        }
        codes::PARAM_NOT_FOUND => {
            "An overlay value targets a parameter key the file does not \
             contain. The value was not applied."
        }
        codes::AXIS_NOT_FOUND => {
            "The resolved overlay addresses an axis id the parameter file \
             has no block for. All values for that axis were skipped."
        }
        codes::RENAMED => {
            "The rename heuristic matched an old field to a new field with a \
             different label. The old value was carried over; verify the \
             match by hand."
        }
        codes::MISSING_IN_TARGET => {
            "An old-file field has no counterpart in the new template, by \
             label or by the rename heuristic. Its value was dropped."
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Issue ────────────────────────────────────────────────────────────

    #[test]
    fn display_without_line() {
        let issue = Issue::new(codes::PARAM_NOT_FOUND, "parameter 'MaxPos' not found");
        assert_eq!(issue.to_string(), "PM3102: parameter 'MaxPos' not found");
    }

    #[test]
    fn display_with_line() {
        let issue = Issue::new(codes::DUPLICATE_LABEL, "duplicate label 'Speed'").with_line(14);
        assert_eq!(issue.to_string(), "PM1102: duplicate label 'Speed' (line 14)");
    }

    #[test]
    fn explain_is_wired_to_codes() {
        let issue = Issue::new(codes::RENAMED, "renamed");
        assert!(issue.explain().is_some());
        assert!(explain("PM9999").is_none());
    }

    #[test]
    fn serializes_without_null_line() {
        let issue = Issue::new(codes::MACHINE_NOT_FOUND, "machine id 'hp' not found");
        let json = serde_json::to_value(&issue).expect("serialize issue");
        assert_eq!(json["code"], "PM2101");
        assert!(json.get("line").is_none(), "absent line must be omitted");
    }

    // ── IssueLog ─────────────────────────────────────────────────────────

    #[test]
    fn log_preserves_insertion_order() {
        let mut log = IssueLog::new();
        assert!(log.is_empty());
        log.push(Issue::new(codes::EMPTY_BLOCK, "first"));
        log.push(Issue::new(codes::AXIS_NOT_FOUND, "second"));
        assert_eq!(log.len(), 2);
        let messages: Vec<&str> = log.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn log_serializes_as_plain_array() {
        let mut log = IssueLog::new();
        log.push(Issue::new(codes::EMPTY_BLOCK, "empty block 'Xr'").with_line(3));
        let json = serde_json::to_value(&log).expect("serialize log");
        assert!(json.is_array());
        assert_eq!(json[0]["line"], 3);
    }

    #[test]
    fn all_codes_have_explanations() {
        let all = [
            codes::DUPLICATE_FIELD,
            codes::DUPLICATE_LABEL,
            codes::UNLABELED_VARIABLE,
            codes::STRAY_ASSIGNMENT,
            codes::STRAY_TAG,
            codes::BLOCK_WITHOUT_NAME,
            codes::EMPTY_BLOCK,
            codes::DUPLICATE_BLOCK,
            codes::MALFORMED_TAG,
            codes::UNPARSED_LINE,
            codes::MACHINE_NOT_FOUND,
            codes::DIMENSION_NOT_FOUND,
            codes::ORPHAN_FIELD,
            codes::UNRECOGNIZED_BLOCK,
            codes::VALUE_LESS_FIELD,
            codes::PARAM_NOT_FOUND,
            codes::AXIS_NOT_FOUND,
            codes::RENAMED,
            codes::MISSING_IN_TARGET,
        ];
        for code in all {
            assert!(explain(code).is_some(), "missing explanation for {code}");
        }
        let mut unique: Vec<&str> = all.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), all.len(), "issue codes must be distinct");
    }
}
