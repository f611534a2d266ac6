//! Typed register addresses encoded in variable names.
//!
//! Control software addresses some parameters through register names of
//! the shape `<class letter><index>`, e.g. `N102` for integer register
//! 102. The rename heuristic uses the class and index to bound how far a
//! renamed register may have moved.

use crate::scan::{Cursor, classify};

/// The four register classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterClass {
    /// `B` registers.
    Bool,
    /// `N` registers.
    Int,
    /// `D` registers.
    Double,
    /// `S` registers.
    Str,
}

/// A register address parsed from a variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    /// Value class from the letter.
    pub class: RegisterClass,
    /// Numeric address.
    pub index: u64,
}

impl Register {
    /// Parse a variable name of the exact shape `<letter><digits>`,
    /// case-insensitive. Anything else is not a register.
    pub fn parse(var: &str) -> Option<Self> {
        let mut cur = Cursor::new(var.as_bytes(), "register").ok()?;
        let class = match cur.collect_while(classify::is_alpha) {
            b"b" | b"B" => RegisterClass::Bool,
            b"n" | b"N" => RegisterClass::Int,
            b"d" | b"D" => RegisterClass::Double,
            b"s" | b"S" => RegisterClass::Str,
            _ => return None,
        };
        let index = cur.extract_unsigned().ok()?;
        if cur.has_data() {
            return None;
        }
        Some(Register { class, index })
    }

    /// Index distance to another register of the same class.
    pub fn distance(self, other: Register) -> Option<u64> {
        (self.class == other.class).then(|| self.index.abs_diff(other.index))
    }
}
