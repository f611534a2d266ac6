//! Line-oriented model of a parameter file.
//!
//! A parsed file is the original byte buffer cut into [`Line`] spans, plus
//! a field table the merge engine edits in place. Lines replay verbatim on
//! write; only lines whose field carries an override are reconstructed.
//! Spans borrow the input buffer, so the buffer must outlive the file.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// The two parameter-file dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `[StartXrAxis]` … `[EndXrAxis]` blocks, fields addressed per axis
    /// by variable name.
    Axis,
    /// One assignment per line, fields addressed by the quoted label of
    /// the trailing comment.
    Flat,
}

impl Dialect {
    /// Detect the dialect from raw file content.
    ///
    /// Any line of the shape `[Start…Axis]` marks the axis dialect;
    /// everything else is flat.
    pub fn sniff(input: &[u8]) -> Self {
        for line in input.split(|&b| b == b'\n') {
            let line = line.trim_ascii();
            if line.starts_with(b"[Start") && line.ends_with(b"Axis]") {
                return Dialect::Axis;
            }
        }
        Dialect::Flat
    }
}

/// Line-ending style, sniffed from the first line and reused for every
/// reconstructed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// The terminator bytes for this style.
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Detect the style of the first line; a lone `\n` or no newline at
    /// all means [`LineEnding::Lf`].
    pub fn sniff(input: &[u8]) -> Self {
        match input.iter().position(|&b| b == b'\n') {
            Some(pos) if pos > 0 && input[pos - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }
}

/// Index of a [`Field`] in its file's field table.
pub type FieldId = usize;

/// One named value with its text trimmings.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// Variable name, left of `=`.
    pub var: Cow<'a, str>,
    /// Original value text, trimmed.
    pub value: Cow<'a, str>,
    /// Comment text after `#`, without any trailing label.
    pub comment: Option<Cow<'a, str>>,
    /// Quoted label at the end of the comment.
    pub label: Option<Cow<'a, str>>,
    /// Leading whitespace of the line, replayed on reconstruction.
    pub indent: Cow<'a, str>,
    /// 1-based source line.
    pub line: u32,
    /// Override value set by the merge engine.
    pub edit: Option<String>,
}

impl Field<'_> {
    /// The override if set, the original value otherwise.
    pub fn effective_value(&self) -> &str {
        self.edit.as_deref().unwrap_or(&self.value)
    }
}

/// One source line: its verbatim bytes and the field parsed from it.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// Raw bytes including the terminator.
    pub raw: &'a [u8],
    /// The field this line defines, if any.
    pub field: Option<FieldId>,
}

/// Fields of one `[Start…Axis]` block, keyed by variable name.
#[derive(Debug, Clone)]
pub struct AxisBlock<'a> {
    /// First-wins variable index for the block.
    pub fields: BTreeMap<Cow<'a, str>, FieldId>,
    /// 1-based line of the opening tag.
    pub start_line: u32,
}

/// A parsed parameter file.
///
/// Built once by [`parse_param_file`](super::parse_param_file); the merge
/// engine then edits fields in place through [`ParamFile::set_override`]
/// and the writer replays the lines.
#[derive(Debug)]
pub struct ParamFile<'a> {
    pub(crate) source: String,
    pub(crate) dialect: Dialect,
    pub(crate) newline: LineEnding,
    /// Bytes before the first line, i.e. a skipped UTF-8 byte-order mark.
    pub(crate) prefix: &'a [u8],
    pub(crate) lines: Vec<Line<'a>>,
    pub(crate) fields: Vec<Field<'a>>,
    /// Flat dialect: first-wins label index.
    pub(crate) labels: BTreeMap<Cow<'a, str>, FieldId>,
    /// Axis dialect: blocks keyed by the value of their `Name` field.
    pub(crate) axes: BTreeMap<Cow<'a, str>, AxisBlock<'a>>,
    /// Index of the first `[EndNote]` line, the provenance insertion point.
    pub(crate) note_end: Option<usize>,
}

impl<'a> ParamFile<'a> {
    /// Display name of the source, usually a path.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The dialect this file was parsed as.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Line-ending style sniffed from the first line.
    pub fn newline(&self) -> LineEnding {
        self.newline
    }

    /// All lines in source order.
    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    /// The field table in parse order; a [`FieldId`] indexes into it.
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// One field by id. Ids come from this file's own tables.
    pub fn field(&self, id: FieldId) -> &Field<'a> {
        &self.fields[id]
    }

    /// Flat-dialect label index.
    pub fn labels(&self) -> &BTreeMap<Cow<'a, str>, FieldId> {
        &self.labels
    }

    /// Axis blocks keyed by the value of their `Name` field.
    pub fn axes(&self) -> &BTreeMap<Cow<'a, str>, AxisBlock<'a>> {
        &self.axes
    }

    /// Look up a flat-dialect field by label.
    pub fn lookup_label(&self, label: &str) -> Option<FieldId> {
        self.labels.get(label).copied()
    }

    /// Look up an axis-dialect field by axis and variable name.
    pub fn lookup_axis_field(&self, axis: &str, var: &str) -> Option<FieldId> {
        self.axes.get(axis)?.fields.get(var).copied()
    }

    /// Index of the first `[EndNote]` line, if the file has one.
    pub fn note_end_line(&self) -> Option<usize> {
        self.note_end
    }

    /// Number of fields carrying an override.
    pub fn modified_count(&self) -> usize {
        self.fields.iter().filter(|f| f.edit.is_some()).count()
    }

    /// Set a field's override value.
    ///
    /// Returns `true` the first time the field is overridden, so callers
    /// can count distinct modified fields while later tiers keep
    /// overwriting earlier ones.
    pub fn set_override(&mut self, id: FieldId, value: impl Into<String>) -> bool {
        let field = &mut self.fields[id];
        let first = field.edit.is_none();
        field.edit = Some(value.into());
        first
    }
}
