//! Per-byte classification table.
//!
//! One 256-entry flag table drives every scanner predicate. Non-ASCII bytes
//! carry no flags, so they never match a structural class and pass through
//! collected text untouched.

const SPACE: u8 = 1 << 0;
const DIGIT: u8 = 1 << 1;
const ALPHA: u8 = 1 << 2;
const PUNCT: u8 = 1 << 3;
const IDENT: u8 = 1 << 4;
const FLOAT: u8 = 1 << 5;

static CLASS: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut b = 0usize;
    while b < 128 {
        let byte = b as u8;
        let mut flags = 0u8;
        if matches!(byte, b' ' | b'\t' | b'\r') {
            flags |= SPACE;
        }
        if byte.is_ascii_digit() {
            flags |= DIGIT | IDENT | FLOAT;
        }
        if byte.is_ascii_alphabetic() {
            flags |= ALPHA | IDENT;
        }
        if byte.is_ascii_punctuation() {
            flags |= PUNCT;
        }
        if matches!(byte, b'_' | b'-' | b'+' | b'.') {
            flags |= IDENT;
        }
        if matches!(byte, b'.' | b'+' | b'-' | b'e' | b'E') {
            flags |= FLOAT;
        }
        table[b] = flags;
        b += 1;
    }
    table
}

fn has(b: u8, flag: u8) -> bool {
    CLASS[b as usize] & flag != 0
}

/// Horizontal whitespace: space, tab, or carriage return.
///
/// `\n` is deliberately excluded; both grammars are line-oriented and treat
/// the newline as structure, not blank space.
pub fn is_space(b: u8) -> bool {
    has(b, SPACE)
}

/// Space class plus the newline.
pub fn is_blank(b: u8) -> bool {
    is_space(b) || b == b'\n'
}

/// ASCII decimal digit.
pub fn is_digit(b: u8) -> bool {
    has(b, DIGIT)
}

/// ASCII letter.
pub fn is_alpha(b: u8) -> bool {
    has(b, ALPHA)
}

/// ASCII letter or digit.
pub fn is_alnum(b: u8) -> bool {
    has(b, ALPHA | DIGIT)
}

/// ASCII punctuation.
pub fn is_punct(b: u8) -> bool {
    has(b, PUNCT)
}

/// Identifier byte: letters, digits, and `_ - + .` (the overlay key set).
pub fn is_identifier(b: u8) -> bool {
    has(b, IDENT)
}

/// Byte that may appear in a decimal float literal.
pub fn is_float_literal(b: u8) -> bool {
    has(b, FLOAT)
}
