//! Byte-faithful output of a parsed, possibly merged, parameter file.

use crate::paramfile::model::{Field, LineEnding, ParamFile};
use paramod_diagnostics::IssueLog;

/// Who touched the file and when, written into the provenance comment.
#[derive(Debug, Clone, Copy)]
pub struct Provenance<'p> {
    /// Tool identity, e.g. `paramod 0.3.1`.
    pub tool: &'p str,
    /// Human-readable timestamp.
    pub timestamp: &'p str,
}

/// Render the file back to bytes.
///
/// Untouched lines replay verbatim, overridden fields are reconstructed
/// as `<indent><var> = <value>[ # comment[ 'label']]` with the sniffed
/// line ending. When `provenance` is given it is written as `#` comment
/// lines right after the first `[EndNote]`, together with the issue count
/// and every accumulated issue; a file without `[EndNote]` gets no
/// provenance at all.
pub fn write_param_file(
    file: &ParamFile<'_>,
    issues: &IssueLog,
    provenance: Option<&Provenance<'_>>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(file.prefix.len() + file.lines.len() * 40);
    out.extend_from_slice(file.prefix);
    for (index, line) in file.lines.iter().enumerate() {
        let edited = line
            .field
            .map(|id| &file.fields[id])
            .filter(|field| field.edit.is_some());
        match edited {
            Some(field) => render_field(&mut out, field, file.newline),
            None => out.extend_from_slice(line.raw),
        }
        if file.note_end == Some(index)
            && let Some(provenance) = provenance
        {
            render_provenance(&mut out, provenance, issues, file.newline);
        }
    }
    out
}

fn render_field(out: &mut Vec<u8>, field: &Field<'_>, newline: LineEnding) {
    out.extend_from_slice(field.indent.as_bytes());
    out.extend_from_slice(field.var.as_bytes());
    out.extend_from_slice(b" = ");
    out.extend_from_slice(field.effective_value().as_bytes());
    if field.comment.is_some() || field.label.is_some() {
        out.extend_from_slice(b" #");
        if let Some(comment) = &field.comment {
            out.push(b' ');
            out.extend_from_slice(comment.as_bytes());
        }
        if let Some(label) = &field.label {
            out.extend_from_slice(b" '");
            out.extend_from_slice(label.as_bytes());
            out.push(b'\'');
        }
    }
    out.extend_from_slice(newline.as_str().as_bytes());
}

fn render_provenance(
    out: &mut Vec<u8>,
    provenance: &Provenance<'_>,
    issues: &IssueLog,
    newline: LineEnding,
) {
    let nl = newline.as_str().as_bytes();
    out.extend_from_slice(
        format!("# adapted by {} on {}", provenance.tool, provenance.timestamp).as_bytes(),
    );
    out.extend_from_slice(nl);
    out.extend_from_slice(format!("# {} issue(s)", issues.len()).as_bytes());
    out.extend_from_slice(nl);
    for issue in issues {
        out.extend_from_slice(format!("# {issue}").as_bytes());
        out.extend_from_slice(nl);
    }
}
