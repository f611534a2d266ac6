//! Parameter files: line model, dialect parsers, and the writer.

/// Line and field model shared by both dialects.
pub mod model;
/// Parser for the axis and flat dialects.
pub mod parser;
/// Byte-faithful writer with provenance insertion.
pub mod writer;

pub use model::{AxisBlock, Dialect, Field, FieldId, Line, LineEnding, ParamFile};
pub use parser::parse_param_file;
pub use writer::{Provenance, write_param_file};
