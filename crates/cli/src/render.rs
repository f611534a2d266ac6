//! Pretty rendering for fatal errors and the issue log using ariadne.
//!
//! Fatal [`ParseError`]s carry a byte offset into their source and render as
//! source-annotated ariadne [`Report`]s. Non-fatal [`Issue`]s carry at most
//! a line number and render as compact one-line warnings. Both go to
//! stderr; stdout stays reserved for command data.
//!
//! [`Issue`]: paramod_diagnostics::Issue

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use paramod_core::ParseError;
use paramod_diagnostics::IssueLog;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated terminal output.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Resolve the `--output` flag to a concrete format based on whether
    /// stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            // Default: pretty for interactive terminals, JSON for pipes
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Fatal errors ────────────────────────────────────────────────────────

/// Render a fatal parse error as a source-annotated report to stderr.
///
/// The error's byte offset is clamped to the source length, so a report on
/// truncated input cannot panic.
pub(crate) fn render_parse_error(source: &[u8], error: &ParseError) {
    let text = String::from_utf8_lossy(source);
    let filename = error.file.as_str();
    let start = error.offset.min(text.len());
    let end = (start + 1).min(text.len()).max(start);

    let mut cache = (filename, Source::from(text.as_ref()));
    Report::build(ReportKind::Error, (filename, start..end))
        .with_message(error.kind.to_string())
        .with_config(Config::default().with_compact(false))
        .with_label(
            Label::new((filename, start..end))
                .with_message(format!("line {}", error.line))
                .with_color(Color::Red),
        )
        .finish()
        .eprint(&mut cache)
        .ok();
}

// ── Issue log ───────────────────────────────────────────────────────────

/// Render every issue as a compact `warning[CODE]:` line on stderr.
///
/// Issues have no byte spans, only optional line numbers, so they skip the
/// source-annotated report machinery entirely.
pub(crate) fn render_issues(issues: &IssueLog) {
    for issue in issues {
        match issue.line {
            Some(line) => eprintln!("warning[{}]: {} (line {line})", issue.code, issue.message),
            None => eprintln!("warning[{}]: {}", issue.code, issue.message),
        }
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured one-line issue count, plus the `explain` tip.
///
/// Prints nothing for an empty log.
pub(crate) fn print_summary(issues: &IssueLog) {
    use ariadne::Fmt;

    let count = issues.len();
    if count == 0 {
        return;
    }
    let s = if count == 1 { "" } else { "s" };
    eprintln!("{}", format!("{count} issue{s}").fg(Color::Yellow));
    eprintln!("tip: use 'paramod explain <CODE>' to describe issue codes.");
}
