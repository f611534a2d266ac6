//! Tests for the parameter-file parsers.
//!
//! Covers: axis-block filing and its issues, flat-dialect labels, note
//! regions, malformed tags, fatal structural errors, and the raw-span
//! integrity both dialects guarantee.

mod common;

use common::{AXIS_FILE, assert_single_issue, clean_file, codes_of, file_with_issues};
use paramod_core::paramfile::Dialect;
use paramod_core::{ParseErrorKind, parse_param_file};
use paramod_diagnostics::{IssueLog, codes};

// ─── 1. Axis dialect ─────────────────────────────────────────────────────────

#[test]
fn blocks_are_filed_under_their_name_field() {
    let file = clean_file(AXIS_FILE, Dialect::Axis);
    let axes: Vec<&str> = file.axes().keys().map(|axis| axis.as_ref()).collect();
    assert_eq!(axes, ["Co", "Sle", "Xr", "Xs", "Yinf", "Ysup"]);

    let id = file
        .lookup_axis_field("Xr", "MaxPos")
        .expect("Xr.MaxPos should be indexed");
    assert_eq!(file.field(id).value, "3000");
    assert_eq!(file.field(id).var, "MaxPos");
}

#[test]
fn duplicate_field_in_a_block_keeps_the_first() {
    let input = "[StartXrAxis]\nName = Xr\nMaxPos = 1\nMaxPos = 2\n[EndXrAxis]\n";
    let (file, issues) = file_with_issues(input, Dialect::Axis);
    assert_single_issue(&issues, codes::DUPLICATE_FIELD);
    let id = file.lookup_axis_field("Xr", "MaxPos").unwrap();
    assert_eq!(file.field(id).value, "1", "first occurrence wins");
    assert_eq!(file.fields().len(), 3, "the loser still parses as a field");
}

#[test]
fn assignment_outside_any_block_is_stray() {
    let input = "Speed = 1\n[StartXrAxis]\nName = Xr\n[EndXrAxis]\n";
    let (file, issues) = file_with_issues(input, Dialect::Axis);
    assert_single_issue(&issues, codes::STRAY_ASSIGNMENT);
    assert_eq!(issues.as_slice()[0].line, Some(1));
    assert!(file.axes().contains_key("Xr"));
}

#[test]
fn foreign_tag_inside_a_block_is_stray() {
    let input = "[StartXrAxis]\nName = Xr\n[Weird]\n[EndXrAxis]\n";
    let (_, issues) = file_with_issues(input, Dialect::Axis);
    assert_single_issue(&issues, codes::STRAY_TAG);
}

#[test]
fn empty_block_is_reported() {
    let input = "[StartXrAxis]\n[EndXrAxis]\n";
    let (file, issues) = file_with_issues(input, Dialect::Axis);
    assert_single_issue(&issues, codes::EMPTY_BLOCK);
    assert!(file.axes().is_empty());
}

#[test]
fn block_without_a_name_field_is_reported() {
    let input = "[StartXrAxis]\nMaxPos = 1\n[EndXrAxis]\n";
    let (file, issues) = file_with_issues(input, Dialect::Axis);
    assert_single_issue(&issues, codes::BLOCK_WITHOUT_NAME);
    assert!(file.axes().is_empty(), "an unnamed block cannot be addressed");
}

#[test]
fn duplicate_block_identity_keeps_the_first() {
    // Different tags, same Name value: identity comes from the field.
    let input = "[StartXrAxis]\nName = Xr\nMaxPos = 1\n[EndXrAxis]\n\
                 [StartXsAxis]\nName = Xr\nMaxPos = 2\n[EndXsAxis]\n";
    let (file, issues) = file_with_issues(input, Dialect::Axis);
    assert_single_issue(&issues, codes::DUPLICATE_BLOCK);
    let id = file.lookup_axis_field("Xr", "MaxPos").unwrap();
    assert_eq!(file.field(id).value, "1", "first block wins");
}

#[test]
fn tags_outside_blocks_are_ignored() {
    let input = "[Revision]\n[StartXrAxis]\nName = Xr\n[EndXrAxis]\n[EndOfFile]\n";
    let (_, issues) = file_with_issues(input, Dialect::Axis);
    assert!(issues.is_empty(), "got: {:?}", codes_of(&issues));
}

// ─── 2. Flat dialect ─────────────────────────────────────────────────────────

#[test]
fn fields_are_indexed_by_label() {
    let input = "[Edit]\nNB100 = 1 # enable head two 'HeadTwo'\nND200 = 2.5 # feed rate 'FeedRate'\n";
    let file = clean_file(input, Dialect::Flat);
    let id = file.lookup_label("FeedRate").expect("label should be indexed");
    let field = file.field(id);
    assert_eq!(field.var, "ND200");
    assert_eq!(field.value, "2.5");
    assert_eq!(field.comment.as_deref(), Some("feed rate"));
    assert_eq!(field.label.as_deref(), Some("FeedRate"));
}

#[test]
fn missing_label_is_reported_and_not_indexed() {
    let input = "NB100 = 1 # just a comment\n";
    let (file, issues) = file_with_issues(input, Dialect::Flat);
    assert_single_issue(&issues, codes::UNLABELED_VARIABLE);
    assert_eq!(file.fields().len(), 1, "the field still parses");
    assert!(file.labels().is_empty());
}

#[test]
fn duplicate_label_keeps_the_first() {
    let input = "NB100 = 1 # flag 'Flag'\nNB101 = 2 # flag too 'Flag'\n";
    let (file, issues) = file_with_issues(input, Dialect::Flat);
    assert_single_issue(&issues, codes::DUPLICATE_LABEL);
    let id = file.lookup_label("Flag").unwrap();
    assert_eq!(file.field(id).var, "NB100", "first occurrence wins");
}

#[test]
fn junk_line_is_reported_in_the_flat_dialect() {
    let input = "NB100 = 1 # flag 'Flag'\n%% garbage\n";
    let (_, issues) = file_with_issues(input, Dialect::Flat);
    assert_single_issue(&issues, codes::UNPARSED_LINE);
}

#[test]
fn value_may_be_empty() {
    let input = "SerialNo = # not assigned yet 'SerialNo'\n";
    let file = clean_file(input, Dialect::Flat);
    let id = file.lookup_label("SerialNo").unwrap();
    assert_eq!(file.field(id).value, "");
}

// ─── 3. Note regions ─────────────────────────────────────────────────────────

#[test]
fn note_region_suppresses_structural_interpretation() {
    let input = "[StartNote]\nMaxPos = 999\n[NotATag\n[EndNote]\nNB100 = 1 # flag 'Flag'\n";
    let (file, issues) = file_with_issues(input, Dialect::Flat);
    assert!(issues.is_empty(), "note content must not parse: {:?}", codes_of(&issues));
    assert_eq!(file.fields().len(), 1, "only the line after the note is a field");
    assert_eq!(file.note_end_line(), Some(3), "the [EndNote] line index");
    assert_eq!(file.lines().len(), 5);
}

#[test]
fn only_the_first_end_note_is_the_insertion_point() {
    let input = "[EndNote]\ntext\n[EndNote]\n";
    let (file, _) = file_with_issues(input, Dialect::Flat);
    assert_eq!(file.note_end_line(), Some(0));
}

#[test]
fn unterminated_note_is_fatal_at_its_start_line() {
    let input = "NB100 = 1 # flag 'Flag'\n[StartNote]\nnever closed\n";
    let mut issues = IssueLog::new();
    let err = parse_param_file(input.as_bytes(), "m.cfg", Dialect::Flat, &mut issues).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnterminatedNote);
    assert_eq!(err.line, 2);
}

#[test]
fn malformed_tags_are_an_issue_not_an_error() {
    for input in ["[Start\n", "[Two Words]\n", "[Tag] extra\n", "[]\n"] {
        let (file, issues) = file_with_issues(input, Dialect::Flat);
        assert_eq!(
            codes_of(&issues),
            vec![codes::MALFORMED_TAG.to_string()],
            "input {input:?}"
        );
        assert_eq!(file.lines().len(), 1);
    }
}

// ─── 4. Fatal structure ──────────────────────────────────────────────────────

#[test]
fn unterminated_axis_block_is_fatal_at_its_start_line() {
    let input = "# header\n[StartXrAxis]\nName = Xr\n";
    let mut issues = IssueLog::new();
    let err = parse_param_file(input.as_bytes(), "m.cfg", Dialect::Axis, &mut issues).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnterminatedAxisBlock);
    assert_eq!(err.line, 2);
}

// ─── 5. Raw-span integrity ───────────────────────────────────────────────────

#[test]
fn every_input_byte_lands_in_exactly_one_line() {
    let inputs = [
        AXIS_FILE.as_bytes().to_vec(),
        b"a = 1 # x 'A'\r\nb = 2 # y 'B'\r\nno trailing newline".to_vec(),
        b"\xEF\xBB\xBFNB1 = 1 # f 'F'\n".to_vec(),
    ];
    for input in &inputs {
        let mut issues = IssueLog::new();
        let file = parse_param_file(input, "m.cfg", Dialect::sniff(input), &mut issues)
            .expect("fixture must parse");
        let total: usize = file.lines().iter().map(|line| line.raw.len()).sum();
        let prefix = input.len() - total;
        assert!(prefix == 0 || prefix == 3, "only a BOM may sit outside lines");
        assert_eq!(total + prefix, input.len(), "spans must tile the input");
    }
}

#[test]
fn crlf_values_are_trimmed() {
    let input = "[StartXrAxis]\r\nName = Xr\r\nMaxPos = 3000\r\n[EndXrAxis]\r\n";
    let file = clean_file(input, Dialect::Axis);
    let id = file.lookup_axis_field("Xr", "MaxPos").unwrap();
    assert_eq!(file.field(id).value, "3000", "no carriage return in the value");
}
