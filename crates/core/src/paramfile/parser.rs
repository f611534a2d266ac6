//! Parser for the two parameter-file dialects.
//!
//! Both dialects are line-oriented: every source line survives as a raw
//! span, and lines that parse as `var = value [# comment ['Label']]` also
//! land in the field table. The axis dialect groups fields into
//! `[StartXrAxis]` … `[EndXrAxis]` blocks filed under the value of their
//! `Name` field; the flat dialect indexes fields by the quoted label at
//! the end of the comment.
//!
//! Only structure that cannot be skipped is fatal: an unterminated
//! `[StartNote]` region or axis block, or a bad encoding. Everything else
//! (duplicate fields, stray assignments, malformed tags) logs an issue and
//! parsing continues, so one odd line never blocks an adaptation run.

use crate::error::{ParseError, ParseErrorKind};
use crate::paramfile::model::{AxisBlock, Dialect, Field, FieldId, Line, LineEnding, ParamFile};
use crate::scan::{Cursor, classify, text};
use paramod_diagnostics::{Issue, IssueLog, codes};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Parse one parameter file in the given dialect.
///
/// Non-fatal problems are appended to `issues`; the returned file is
/// complete whenever this returns `Ok`.
pub fn parse_param_file<'a>(
    input: &'a [u8],
    source: &str,
    dialect: Dialect,
    issues: &mut IssueLog,
) -> Result<ParamFile<'a>, ParseError> {
    let cur = Cursor::new(input, source)?;
    let file = ParamFile {
        source: source.to_owned(),
        dialect,
        newline: LineEnding::sniff(input),
        prefix: &input[..cur.pos()],
        lines: Vec::new(),
        fields: Vec::new(),
        labels: BTreeMap::new(),
        axes: BTreeMap::new(),
        note_end: None,
    };
    let mut parser = FileParser {
        cur,
        file,
        open_block: None,
        issues,
    };
    parser.run()?;
    Ok(parser.file)
}

/// An axis block whose end tag has not been seen yet.
struct OpenBlock<'a> {
    expected_end: String,
    start_line: u32,
    start_offset: usize,
    fields: BTreeMap<Cow<'a, str>, FieldId>,
}

struct FileParser<'a, 'i> {
    cur: Cursor<'a>,
    file: ParamFile<'a>,
    open_block: Option<OpenBlock<'a>>,
    issues: &'i mut IssueLog,
}

impl<'a> FileParser<'a, '_> {
    fn run(&mut self) -> Result<(), ParseError> {
        while self.cur.has_data() {
            self.parse_line()?;
        }
        if let Some(open) = &self.open_block {
            return Err(self.cur.error_at(
                open.start_line,
                open.start_offset,
                ParseErrorKind::UnterminatedAxisBlock,
            ));
        }
        Ok(())
    }

    fn parse_line(&mut self) -> Result<(), ParseError> {
        let start = self.cur.pos();
        let line = self.cur.line();
        let indent = self.cur.collect_while(classify::is_space);
        match self.cur.current() {
            None | Some(b'\n') | Some(b'#') => self.finish_line(start, None),
            Some(b'[') => {
                let note = self.parse_tag(line, start);
                self.finish_line(start, None);
                if note {
                    self.consume_note(line, start)?;
                }
            }
            Some(_) => {
                let field = self.parse_assignment(indent, line);
                self.finish_line(start, field);
            }
        }
        Ok(())
    }

    /// Skip to end of line and record the raw span.
    fn finish_line(&mut self, start: usize, field: Option<FieldId>) {
        self.cur.skip_until(|b| b == b'\n');
        self.cur.eat(b"\n");
        self.file.lines.push(Line {
            raw: self.cur.slice_from(start),
            field,
        });
    }

    /// Parse a `[Name]` tag line. Returns `true` when the tag opens a
    /// `[StartNote]` region, which the caller then consumes.
    fn parse_tag(&mut self, line: u32, start: usize) -> bool {
        self.cur.advance();
        let name_raw = self.cur.collect_while(classify::is_identifier);
        let closed = self.cur.eat(b"]");
        self.cur.skip_while(classify::is_space);
        let at_end = matches!(self.cur.current(), None | Some(b'\n'));
        if name_raw.is_empty() || !closed || !at_end {
            self.issues
                .push(Issue::new(codes::MALFORMED_TAG, "malformed tag line").with_line(line));
            return false;
        }
        let name = text(name_raw);
        match name.as_ref() {
            "StartNote" => return true,
            // The first [EndNote] is the provenance insertion point; the
            // line index is what lines.len() will be once finish_line runs.
            "EndNote" => {
                if self.file.note_end.is_none() {
                    self.file.note_end = Some(self.file.lines.len());
                }
            }
            _ if self.file.dialect == Dialect::Axis => self.dispatch_axis_tag(&name, line, start),
            _ => {}
        }
        false
    }

    fn dispatch_axis_tag(&mut self, name: &str, line: u32, start: usize) {
        if let Some(open) = self.open_block.take_if(|open| open.expected_end == name) {
            self.close_block(open);
            return;
        }
        if self.open_block.is_some() {
            self.issues.push(
                Issue::new(
                    codes::STRAY_TAG,
                    format!("unexpected tag '[{name}]' inside an axis block"),
                )
                .with_line(line),
            );
            return;
        }
        if let Some(stem) = name
            .strip_prefix("Start")
            .and_then(|rest| rest.strip_suffix("Axis"))
            && !stem.is_empty()
        {
            self.open_block = Some(OpenBlock {
                expected_end: format!("End{stem}Axis"),
                start_line: line,
                start_offset: start,
                fields: BTreeMap::new(),
            });
        }
    }

    /// File a closed block under the value of its `Name` field.
    fn close_block(&mut self, open: OpenBlock<'a>) {
        if open.fields.is_empty() {
            self.issues.push(
                Issue::new(codes::EMPTY_BLOCK, "axis block has no fields")
                    .with_line(open.start_line),
            );
            return;
        }
        let Some(&name_id) = open.fields.get("Name") else {
            self.issues.push(
                Issue::new(codes::BLOCK_WITHOUT_NAME, "axis block has no 'Name' field")
                    .with_line(open.start_line),
            );
            return;
        };
        let axis = self.file.fields[name_id].value.clone();
        match self.file.axes.entry(axis) {
            Entry::Vacant(slot) => {
                slot.insert(AxisBlock {
                    fields: open.fields,
                    start_line: open.start_line,
                });
            }
            Entry::Occupied(existing) => {
                self.issues.push(
                    Issue::new(
                        codes::DUPLICATE_BLOCK,
                        format!(
                            "duplicate axis block '{}' (first block on line {} wins)",
                            existing.key(),
                            existing.get().start_line
                        ),
                    )
                    .with_line(open.start_line),
                );
            }
        }
    }

    /// Push every raw line of a `[StartNote]` region as field-less.
    fn consume_note(&mut self, line: u32, start: usize) -> Result<(), ParseError> {
        let Some(region) = self.cur.collect_until_line_token(b"[EndNote]") else {
            return Err(self
                .cur
                .error_at(line, start, ParseErrorKind::UnterminatedNote));
        };
        let mut rest = region;
        while !rest.is_empty() {
            let end = rest
                .iter()
                .position(|&b| b == b'\n')
                .map_or(rest.len(), |pos| pos + 1);
            let (raw, tail) = rest.split_at(end);
            self.file.lines.push(Line { raw, field: None });
            rest = tail;
        }
        Ok(())
    }

    fn parse_assignment(&mut self, indent: &'a [u8], line: u32) -> Option<FieldId> {
        let var_raw = self.cur.collect_while(classify::is_identifier);
        self.cur.skip_while(classify::is_space);
        if var_raw.is_empty() || !self.cur.eat(b"=") {
            self.report_unparsed(line);
            return None;
        }
        self.cur.skip_while(classify::is_space);
        let value_raw = self
            .cur
            .collect_until(|b| b == b'#' || b == b'\n')
            .trim_ascii_end();
        let (comment, label) = if self.cur.eat(b"#") {
            split_label(self.cur.collect_until(|b| b == b'\n'))
        } else {
            (None, None)
        };
        let id = self.file.fields.len();
        self.file.fields.push(Field {
            var: text(var_raw),
            value: text(value_raw),
            comment,
            label,
            indent: text(indent),
            line,
            edit: None,
        });
        self.index_field(id, line);
        Some(id)
    }

    /// File a new field in the dialect's lookup table, first wins.
    fn index_field(&mut self, id: FieldId, line: u32) {
        match self.file.dialect {
            Dialect::Axis => {
                let var = self.file.fields[id].var.clone();
                let Some(open) = self.open_block.as_mut() else {
                    self.issues.push(
                        Issue::new(
                            codes::STRAY_ASSIGNMENT,
                            format!("assignment '{var}' outside any axis block"),
                        )
                        .with_line(line),
                    );
                    return;
                };
                match open.fields.entry(var) {
                    Entry::Vacant(slot) => {
                        slot.insert(id);
                    }
                    Entry::Occupied(entry) => {
                        let first = self.file.fields[*entry.get()].line;
                        self.issues.push(
                            Issue::new(
                                codes::DUPLICATE_FIELD,
                                format!("field '{}' already set on line {first}", entry.key()),
                            )
                            .with_line(line),
                        );
                    }
                }
            }
            Dialect::Flat => {
                let Some(label) = self.file.fields[id].label.clone() else {
                    let var = self.file.fields[id].var.clone();
                    self.issues.push(
                        Issue::new(
                            codes::UNLABELED_VARIABLE,
                            format!("variable '{var}' has no label"),
                        )
                        .with_line(line),
                    );
                    return;
                };
                match self.file.labels.entry(label) {
                    Entry::Vacant(slot) => {
                        slot.insert(id);
                    }
                    Entry::Occupied(entry) => {
                        let first = self.file.fields[*entry.get()].line;
                        self.issues.push(
                            Issue::new(
                                codes::DUPLICATE_LABEL,
                                format!("label '{}' already used on line {first}", entry.key()),
                            )
                            .with_line(line),
                        );
                    }
                }
            }
        }
    }

    fn report_unparsed(&mut self, line: u32) {
        if self.file.dialect == Dialect::Flat || self.open_block.is_some() {
            self.issues.push(
                Issue::new(codes::UNPARSED_LINE, "line cannot be parsed as an assignment")
                    .with_line(line),
            );
        }
    }
}

/// Split the text after `#` into comment and trailing `'Label'`.
///
/// The label is the content of the last quoted token when it closes the
/// comment; an apostrophe earlier in the comment stays in the comment.
/// An empty label (`''`) does not count.
fn split_label(raw: &[u8]) -> (Option<Cow<'_, str>>, Option<Cow<'_, str>>) {
    let trimmed = raw.trim_ascii();
    if let Some(body) = trimmed.strip_suffix(b"'")
        && let Some(open) = body.iter().rposition(|&b| b == b'\'')
        && open + 1 < body.len()
    {
        let label = &body[open + 1..];
        let comment = body[..open].trim_ascii_end();
        let comment = (!comment.is_empty()).then(|| text(comment));
        return (comment, Some(text(label)));
    }
    let comment = (!trimmed.is_empty()).then(|| text(trimmed));
    (comment, None)
}
