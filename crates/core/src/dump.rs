//! Owned, serializable views of parsed data for JSON output.

use crate::paramfile::{Dialect, LineEnding, ParamFile};
use serde::Serialize;

/// Serialize a view to a pretty-printed JSON string.
pub fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("view serialization cannot fail")
}

/// Snapshot of a parsed file, detached from the input buffer.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    /// Source name the file was parsed from.
    pub source: String,
    /// Detected or requested dialect.
    pub dialect: Dialect,
    /// Sniffed line-ending style.
    pub newline: LineEnding,
    /// Total line count.
    pub lines: usize,
    /// Fields carrying an override.
    pub modified: usize,
    /// Every parsed field in source order.
    pub fields: Vec<FieldView>,
    /// Axis names, axis dialect only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<String>,
}

/// One field of a [`FileSummary`].
#[derive(Debug, Serialize)]
pub struct FieldView {
    /// Variable name.
    pub var: String,
    /// Original value.
    pub value: String,
    /// Override value, when the merge engine set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
    /// Comment text without the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Quoted label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 1-based source line.
    pub line: u32,
}

/// Build an owned summary of `file`.
pub fn summarize(file: &ParamFile<'_>) -> FileSummary {
    FileSummary {
        source: file.source().to_owned(),
        dialect: file.dialect(),
        newline: file.newline(),
        lines: file.lines().len(),
        modified: file.modified_count(),
        fields: file
            .fields()
            .iter()
            .map(|field| FieldView {
                var: field.var.as_ref().to_owned(),
                value: field.value.as_ref().to_owned(),
                edit: field.edit.clone(),
                comment: field.comment.as_deref().map(str::to_owned),
                label: field.label.as_deref().map(str::to_owned),
                line: field.line,
            })
            .collect(),
        axes: file
            .axes()
            .keys()
            .map(|axis| axis.as_ref().to_owned())
            .collect(),
    }
}
