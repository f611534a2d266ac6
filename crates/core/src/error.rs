//! Fatal parse errors.
//!
//! Structural problems abort the whole run through this typed error; they
//! are the fail-fast channel. Semantic problems (unmatched overlays,
//! duplicate labels, …) never land here; they accumulate in the issue log
//! while parsing and merging continue.

use thiserror::Error;

/// A fatal structural error from one of the text parsers.
///
/// Carries the source name, the 1-based line, and the byte offset where the
/// problem sits. For unterminated constructs the position is the opening
/// line, not the end of input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: {kind}")]
pub struct ParseError {
    /// Display name of the source, usually a path.
    pub file: String,
    /// 1-based line of the problem.
    pub line: u32,
    /// Byte offset of the problem.
    pub offset: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// The structural failures the parsers can hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The input has no content after any byte-order mark.
    #[error("empty input")]
    EmptyInput,

    /// The input opens with a UTF-16 or UTF-32 byte-order mark.
    #[error("unsupported encoding (UTF-16/UTF-32 byte-order mark)")]
    UnsupportedEncoding,

    /// A `{` block was still open at end of input.
    #[error("unterminated block")]
    UnterminatedBlock,

    /// A `[StartNote]` region was still open at end of input.
    #[error("unterminated note region")]
    UnterminatedNote,

    /// An axis block was still open at end of input.
    #[error("unterminated axis block")]
    UnterminatedAxisBlock,

    /// A quoted string ran into a line break or end of input.
    #[error("unterminated quoted string")]
    UnterminatedString,

    /// A `/*` comment was still open at end of input.
    #[error("unterminated block comment")]
    UnterminatedComment,

    /// A key was not followed by `:` or `=`.
    #[error("expected ':' or '=' after key")]
    ExpectedSeparator,

    /// A nested block was introduced with `=` instead of `:`.
    #[error("nested block requires ':' separator")]
    BlockAfterEquals,

    /// A key was required but none was found.
    #[error("expected a key")]
    ExpectedKey,

    /// A separator was not followed by a value on the same line.
    #[error("expected a value")]
    MissingValue,

    /// A double quote appeared inside an unquoted value.
    #[error("illegal character in unquoted value")]
    IllegalValueChar,

    /// A `}` appeared with no open block.
    #[error("unexpected '}}' with no open block")]
    UnbalancedBrace,

    /// Two entries collide under the same key.
    #[error("conflicting duplicate key '{path}'")]
    DuplicateKey {
        /// Slash-joined path of the colliding key.
        path: String,
    },

    /// A number was required but none was found.
    #[error("expected a number")]
    ExpectedNumber,

    /// A numeric literal does not fit its integer type.
    #[error("numeric literal out of range")]
    NumberOverflow,
}
