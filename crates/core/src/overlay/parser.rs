//! Recursive-descent parser for the overlay database format.
//!
//! The format is a nested block grammar:
//!
//! ```text
//! hp: {
//!     common: { "Max speed": 5000, Ramp: 12 }
//!     cut-bridge: {
//!         6.0: { "Max speed": 5500 }
//!     }
//!     +opp: { "Head count": 2 }
//! }
//! ```
//!
//! Keys are identifiers (letters, digits, `_ - + .`) or double-quoted
//! strings; a comma-separated key list fans the entry out to every named
//! key. `:` introduces a value or a nested block, `=` a value only.
//! `//` and `/* */` comments are skipped, and stray `,` / `;` between
//! entries are tolerated. Structural mistakes are fatal: this file is
//! authored once and trusted everywhere, so nothing is repaired silently.

use crate::error::{ParseError, ParseErrorKind};
use crate::overlay::node::{GroupMap, OverlayNode, OverlayTree, merge_into};
use crate::scan::{Cursor, classify, text};
use std::borrow::Cow;

/// Parse one overlay database file.
pub fn parse_overlay<'a>(input: &'a [u8], source: &str) -> Result<OverlayTree<'a>, ParseError> {
    let mut cur = Cursor::new(input, source)?;
    let mut root = GroupMap::new();
    parse_entries(&mut cur, &mut root, None)?;
    Ok(OverlayTree { root })
}

/// Bytes that terminate an unquoted value.
fn is_value_end(b: u8) -> bool {
    classify::is_blank(b) || matches!(b, b':' | b'{' | b'}' | b',' | b';' | b'=')
}

/// Parse entries until `}` (nested) or end of input (top level).
///
/// `opened` carries the enclosing `{` position so an unterminated block is
/// reported where it began.
fn parse_entries<'a>(
    cur: &mut Cursor<'a>,
    target: &mut GroupMap<'a>,
    opened: Option<(u32, usize)>,
) -> Result<(), ParseError> {
    loop {
        skip_trivia(cur)?;
        match cur.current() {
            None => {
                return match opened {
                    Some((line, offset)) => {
                        Err(cur.error_at(line, offset, ParseErrorKind::UnterminatedBlock))
                    }
                    None => Ok(()),
                };
            }
            Some(b'}') => {
                if opened.is_none() {
                    return Err(cur.error(ParseErrorKind::UnbalancedBrace));
                }
                cur.advance();
                return Ok(());
            }
            Some(_) => parse_entry(cur, target)?,
        }
    }
}

/// One `key-list separator value-or-block` entry, fanned out to every key.
fn parse_entry<'a>(cur: &mut Cursor<'a>, target: &mut GroupMap<'a>) -> Result<(), ParseError> {
    let mut keys = parse_key_list(cur)?;
    cur.skip_while(classify::is_space);

    let sep_line = cur.line();
    let sep_offset = cur.pos();
    let colon = if cur.eat(b":") {
        true
    } else if cur.eat(b"=") {
        false
    } else {
        return Err(cur.error(ParseErrorKind::ExpectedSeparator));
    };
    cur.skip_while(classify::is_space);

    let node = if cur.current() == Some(b'{') {
        if !colon {
            return Err(cur.error_at(sep_line, sep_offset, ParseErrorKind::BlockAfterEquals));
        }
        let opened = (cur.line(), cur.pos());
        cur.advance();
        let mut children = GroupMap::new();
        parse_entries(cur, &mut children, Some(opened))?;
        OverlayNode::Group(children)
    } else {
        OverlayNode::Leaf(parse_value(cur)?)
    };

    // `keys` is never empty: parse_key_list fails on a missing first key.
    if let Some((last_key, last_line, last_offset)) = keys.pop() {
        for (key, line, offset) in keys {
            insert(cur, target, key, node.clone(), line, offset)?;
        }
        insert(cur, target, last_key, node, last_line, last_offset)?;
    }
    Ok(())
}

fn insert<'a>(
    cur: &Cursor<'a>,
    target: &mut GroupMap<'a>,
    key: Cow<'a, str>,
    node: OverlayNode<'a>,
    line: u32,
    offset: usize,
) -> Result<(), ParseError> {
    merge_into(target, key, node).map_err(|conflict| {
        cur.error_at(
            line,
            offset,
            ParseErrorKind::DuplicateKey {
                path: conflict.path,
            },
        )
    })
}

/// `key ("," key)*`, each key with the position it started at.
type KeyList<'a> = Vec<(Cow<'a, str>, u32, usize)>;

fn parse_key_list<'a>(cur: &mut Cursor<'a>) -> Result<KeyList<'a>, ParseError> {
    let mut keys = vec![parse_key(cur)?];
    loop {
        cur.skip_while(classify::is_space);
        if !cur.eat(b",") {
            break;
        }
        skip_trivia(cur)?;
        keys.push(parse_key(cur)?);
    }
    Ok(keys)
}

fn parse_key<'a>(cur: &mut Cursor<'a>) -> Result<(Cow<'a, str>, u32, usize), ParseError> {
    let line = cur.line();
    let offset = cur.pos();
    if cur.eat(b"\"") {
        let raw = quoted_rest(cur, line, offset)?;
        Ok((text(raw), line, offset))
    } else {
        let raw = cur.collect_while(classify::is_identifier);
        if raw.is_empty() {
            return Err(cur.error(ParseErrorKind::ExpectedKey));
        }
        Ok((text(raw), line, offset))
    }
}

fn parse_value<'a>(cur: &mut Cursor<'a>) -> Result<Cow<'a, str>, ParseError> {
    let line = cur.line();
    let offset = cur.pos();
    if cur.eat(b"\"") {
        let raw = quoted_rest(cur, line, offset)?;
        Ok(text(raw))
    } else {
        let raw = cur.collect_until_guarded(
            is_value_end,
            |b| b == b'"',
            ParseErrorKind::IllegalValueChar,
        )?;
        if raw.is_empty() {
            return Err(cur.error(ParseErrorKind::MissingValue));
        }
        Ok(text(raw))
    }
}

/// The rest of a quoted string after the opening `"` has been consumed.
///
/// No escape sequences: the next `"` always closes the string, and a line
/// break or end of input before it is fatal at the opening quote.
fn quoted_rest<'a>(cur: &mut Cursor<'a>, line: u32, offset: usize) -> Result<&'a [u8], ParseError> {
    let raw = cur
        .collect_until_guarded(
            |b| b == b'"',
            |b| b == b'\n',
            ParseErrorKind::UnterminatedString,
        )
        .map_err(|mut err| {
            err.line = line;
            err.offset = offset;
            err
        })?;
    if !cur.eat(b"\"") {
        return Err(cur.error_at(line, offset, ParseErrorKind::UnterminatedString));
    }
    Ok(raw)
}

/// Skip whitespace, newlines, comments, and stray `,` / `;` separators.
fn skip_trivia(cur: &mut Cursor<'_>) -> Result<(), ParseError> {
    loop {
        cur.skip_while(|b| classify::is_blank(b) || b == b',' || b == b';');
        if cur.eat(b"//") {
            cur.skip_until(|b| b == b'\n');
            continue;
        }
        let line = cur.line();
        let offset = cur.pos();
        if cur.eat(b"/*") {
            loop {
                cur.skip_until(|b| b == b'*');
                if !cur.has_data() {
                    return Err(cur.error_at(line, offset, ParseErrorKind::UnterminatedComment));
                }
                if cur.eat(b"*/") {
                    break;
                }
                cur.advance();
            }
            continue;
        }
        return Ok(());
    }
}
