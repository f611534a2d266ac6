//! Input scanning: byte classification and the zero-copy cursor.

/// Per-byte classification predicates.
pub mod classify;
/// The scanning cursor.
pub mod cursor;

pub use cursor::Cursor;

use std::borrow::Cow;

/// Borrow a collected byte slice as text.
///
/// ASCII input stays borrowed; invalid UTF-8 is replaced lossily rather than
/// failing, matching how the vendor files treat stray high bytes.
pub fn text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
