//! Single-pass cursor over an immutable input buffer.

use crate::error::{ParseError, ParseErrorKind};
use crate::scan::classify;

/// Zero-copy scanning cursor.
///
/// Walks a borrowed byte buffer once, tracking the 1-based line and the byte
/// offset for error reporting. Collect-style primitives hand back slices of
/// the buffer; nothing is copied until the caller converts a slice to text.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    line: u32,
    source: String,
}

impl<'a> Cursor<'a> {
    /// Wrap an input buffer.
    ///
    /// A leading UTF-8 byte-order mark is skipped silently. A UTF-16 or
    /// UTF-32 mark is fatal, as is a buffer with no content at all.
    pub fn new(buf: &'a [u8], source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let fail = |kind| ParseError {
            file: source.clone(),
            line: 1,
            offset: 0,
            kind,
        };
        // The UTF-32 LE mark FF FE 00 00 starts with the UTF-16 LE mark, so
        // the two-byte checks cover it; UTF-32 BE needs its own check.
        if buf.starts_with(&[0xFF, 0xFE])
            || buf.starts_with(&[0xFE, 0xFF])
            || buf.starts_with(&[0x00, 0x00, 0xFE, 0xFF])
        {
            return Err(fail(ParseErrorKind::UnsupportedEncoding));
        }
        let pos = if buf.starts_with(&[0xEF, 0xBB, 0xBF]) { 3 } else { 0 };
        if buf.len() == pos {
            return Err(fail(ParseErrorKind::EmptyInput));
        }
        Ok(Self {
            buf,
            pos,
            line: 1,
            source,
        })
    }

    /// The byte under the cursor, or `None` at end of input.
    pub fn current(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// True while input remains.
    pub fn has_data(&self) -> bool {
        self.pos < self.buf.len()
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current 1-based line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Display name of the source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume one byte, counting lines.
    pub fn advance(&mut self) {
        if let Some(b) = self.current() {
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    /// Consume `literal` if the input starts with it here.
    pub fn eat(&mut self, literal: &[u8]) -> bool {
        if self.buf[self.pos..].starts_with(literal) {
            for _ in 0..literal.len() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    /// Like [`Cursor::eat`], but only when the byte after the literal is not
    /// an identifier byte, so `common` does not match inside `commonX`.
    pub fn eat_token(&mut self, literal: &[u8]) -> bool {
        if self.matches_token(literal) {
            for _ in 0..literal.len() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    /// Non-consuming form of [`Cursor::eat_token`].
    pub fn matches_token(&self, literal: &[u8]) -> bool {
        self.buf[self.pos..].starts_with(literal)
            && !self
                .buf
                .get(self.pos + literal.len())
                .copied()
                .is_some_and(classify::is_identifier)
    }

    /// Consume bytes while `pred` holds; returns how many were consumed.
    pub fn skip_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.current().is_some_and(&pred) {
            self.advance();
        }
        self.pos - start
    }

    /// Consume bytes until `pred` holds or input ends; returns the count.
    pub fn skip_until(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while let Some(b) = self.current() {
            if pred(b) {
                break;
            }
            self.advance();
        }
        self.pos - start
    }

    /// Collect bytes while `pred` holds.
    pub fn collect_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        self.skip_while(pred);
        &self.buf[start..self.pos]
    }

    /// Collect bytes until `pred` holds or input ends.
    pub fn collect_until(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        self.skip_until(pred);
        &self.buf[start..self.pos]
    }

    /// Collect until `end` matches; end of input also ends the run.
    ///
    /// If `unexpected` matches first, the cursor is restored to where the
    /// call started and `kind` is raised there; a failed attempt never
    /// advances visible state. Callers that require a real terminator check
    /// what follows the returned slice.
    pub fn collect_until_guarded(
        &mut self,
        end: impl Fn(u8) -> bool,
        unexpected: impl Fn(u8) -> bool,
        kind: ParseErrorKind,
    ) -> Result<&'a [u8], ParseError> {
        let start = self.pos;
        let start_line = self.line;
        while let Some(b) = self.current() {
            if end(b) {
                break;
            }
            if unexpected(b) {
                self.pos = start;
                self.line = start_line;
                return Err(self.error(kind));
            }
            self.advance();
        }
        Ok(&self.buf[start..self.pos])
    }

    /// Parse a decimal unsigned integer.
    ///
    /// The bound check runs before each multiply, so the accumulator can
    /// never wrap; a handful of values within one digit-append of
    /// `u64::MAX` are rejected along with real overflows.
    pub fn extract_unsigned(&mut self) -> Result<u64, ParseError> {
        const CUTOFF: u64 = (u64::MAX - 9) / 10;
        if !self.current().is_some_and(classify::is_digit) {
            return Err(self.error(ParseErrorKind::ExpectedNumber));
        }
        let mut value: u64 = 0;
        while let Some(b) = self.current() {
            if !classify::is_digit(b) {
                break;
            }
            if value > CUTOFF {
                return Err(self.error(ParseErrorKind::NumberOverflow));
            }
            value = value * 10 + u64::from(b - b'0');
            self.advance();
        }
        Ok(value)
    }

    /// Parse a decimal signed integer with an optional leading sign.
    ///
    /// The magnitude accumulates under the same conservative cutoff as
    /// [`Cursor::extract_unsigned`], so `i64::MIN` itself is rejected.
    pub fn extract_signed(&mut self) -> Result<i64, ParseError> {
        const CUTOFF: i64 = (i64::MAX - 9) / 10;
        let negative = self.eat(b"-");
        if !negative {
            self.eat(b"+");
        }
        if !self.current().is_some_and(classify::is_digit) {
            return Err(self.error(ParseErrorKind::ExpectedNumber));
        }
        let mut value: i64 = 0;
        while let Some(b) = self.current() {
            if !classify::is_digit(b) {
                break;
            }
            if value > CUTOFF {
                return Err(self.error(ParseErrorKind::NumberOverflow));
            }
            value = value * 10 + i64::from(b - b'0');
            self.advance();
        }
        Ok(if negative { -value } else { value })
    }

    /// Parse a decimal float by direct accumulation: optional sign, integer
    /// digits, fractional digits scaled by falling powers of ten, optional
    /// `e`/`E` exponent. No locale handling, no hex floats.
    pub fn extract_float(&mut self) -> Result<f64, ParseError> {
        let negative = self.eat(b"-");
        if !negative {
            self.eat(b"+");
        }
        let mut value = 0f64;
        let mut any_digit = false;
        while let Some(b) = self.current() {
            if !classify::is_digit(b) {
                break;
            }
            value = value * 10.0 + f64::from(b - b'0');
            any_digit = true;
            self.advance();
        }
        if self.eat(b".") {
            let mut scale = 0.1;
            while let Some(b) = self.current() {
                if !classify::is_digit(b) {
                    break;
                }
                value += f64::from(b - b'0') * scale;
                scale /= 10.0;
                any_digit = true;
                self.advance();
            }
        }
        if !any_digit {
            return Err(self.error(ParseErrorKind::ExpectedNumber));
        }
        if self.eat(b"e") || self.eat(b"E") {
            let exp = self.extract_signed()?;
            let exp = exp.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            value *= 10f64.powi(exp);
        }
        Ok(if negative { -value } else { value })
    }

    /// Scan forward line by line for a line whose first non-blank token is
    /// `token`, and return everything before that line.
    ///
    /// On a match the cursor is left at the matching line's start. When no
    /// such line exists the cursor is restored and `None` is returned.
    pub fn collect_until_line_token(&mut self, token: &[u8]) -> Option<&'a [u8]> {
        let start = self.pos;
        let start_line = self.line;
        loop {
            let line_start = self.pos;
            let line_start_line = self.line;
            self.skip_while(classify::is_space);
            if self.matches_token(token) {
                self.pos = line_start;
                self.line = line_start_line;
                return Some(&self.buf[start..line_start]);
            }
            self.skip_until(|b| b == b'\n');
            if !self.has_data() {
                self.pos = start;
                self.line = start_line;
                return None;
            }
            self.advance();
        }
    }

    /// The bytes consumed since `start`.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }

    /// Fatal error at the current position.
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.line, self.pos, kind)
    }

    /// Fatal error at a remembered position.
    pub fn error_at(&self, line: u32, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            file: self.source.clone(),
            line,
            offset,
            kind,
        }
    }
}
