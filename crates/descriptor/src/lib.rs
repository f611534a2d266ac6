//! Machine descriptor parsing and canonical serialization.
//!
//! A machine descriptor is the short identification string that keys the
//! overlay database: a family token, up to two size dimensions, and a list
//! of option words, e.g. `HP*6.0*4.6*(opp,tilt)`. Parsing is
//! case-insensitive and tolerant of the punctuation used to join the parts;
//! [`MachineDescriptor`]'s `Display` impl produces the canonical form, which
//! re-parses to a structurally equal descriptor.

#![warn(missing_docs)]

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Cut-bridge sizes a machine can be built with, in metres.
pub const CUT_BRIDGE_SIZES: [f64; 6] = [3.2, 3.7, 4.3, 5.0, 6.0, 6.7];

/// Align-span sizes a machine can be built with, in metres.
pub const ALIGN_SPAN_SIZES: [f64; 5] = [2.0, 2.6, 3.4, 4.6, 5.2];

/// How far a descriptor dimension may sit from a table entry and still snap
/// to it, inclusive.
pub const DIMENSION_TOLERANCE: f64 = 0.2;

/// Errors from parsing a machine descriptor string.
#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    /// The descriptor string is empty or whitespace.
    #[error("empty machine descriptor")]
    Empty,

    /// The leading token matches no known machine family.
    #[error("unknown machine family in '{0}'")]
    UnknownFamily(String),

    /// A dimension is too far from every size-table entry.
    #[error("no {kind} size within {tolerance} of {value}")]
    DimensionOutOfRange {
        /// Which size table was searched.
        kind: DimensionKind,
        /// The value found in the descriptor string.
        value: f64,
        /// The tolerance the search used.
        tolerance: f64,
    },
}

// ── Family ───────────────────────────────────────────────────────────────

/// Closed set of machine families.
///
/// `Hp`, `W`, and `Strato` form the strato super-family (bridge machines
/// with cut-bridge/align-span dimensions); `Jet` and `Float` form the float
/// super-family, which carries no dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// High-power strato bridge.
    Hp,
    /// Wide-table strato bridge.
    W,
    /// Base strato bridge.
    Strato,
    /// Waterjet float machine.
    Jet,
    /// Base float machine.
    Float,
}

impl Family {
    /// Classify a lowercased family token.
    ///
    /// The rules are ordered and not prefix-free: the more specific suffixes
    /// win over the broad substring checks, so `whp` is `Hp`, not `W`.
    fn classify(token: &str) -> Option<Self> {
        if token.ends_with("hp") {
            Some(Family::Hp)
        } else if token.ends_with("jet") {
            Some(Family::Jet)
        } else if token.contains('w') {
            Some(Family::W)
        } else if token.contains("strato") {
            Some(Family::Strato)
        } else if token.contains("float") {
            Some(Family::Float)
        } else {
            None
        }
    }

    /// Stable lowercase id, used as the overlay database's top-level key.
    pub fn id(self) -> &'static str {
        match self {
            Family::Hp => "hp",
            Family::W => "w",
            Family::Strato => "strato",
            Family::Jet => "jet",
            Family::Float => "float",
        }
    }

    /// True for the strato super-family (dimensioned bridge machines).
    pub fn is_strato(self) -> bool {
        matches!(self, Family::Hp | Family::W | Family::Strato)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ── Dimensions ───────────────────────────────────────────────────────────

/// Which size table a dimension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DimensionKind {
    /// Cut-bridge width, [`CUT_BRIDGE_SIZES`].
    #[serde(rename = "cut-bridge")]
    CutBridge,
    /// Align-span length, [`ALIGN_SPAN_SIZES`].
    #[serde(rename = "algn-span")]
    AlignSpan,
}

impl DimensionKind {
    /// The overlay-database group name for this dimension kind.
    pub fn label(self) -> &'static str {
        match self {
            DimensionKind::CutBridge => "cut-bridge",
            DimensionKind::AlignSpan => "algn-span",
        }
    }

    fn table(self) -> &'static [f64] {
        match self {
            DimensionKind::CutBridge => &CUT_BRIDGE_SIZES,
            DimensionKind::AlignSpan => &ALIGN_SPAN_SIZES,
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A machine dimension snapped to its size table.
///
/// Always holds an exact table entry, never the raw descriptor value, so
/// [`Dimension`]'s `Display` output is a valid overlay-database key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dimension(f64);

impl Dimension {
    /// Snap `value` to the nearest entry of `kind`'s size table within
    /// [`DIMENSION_TOLERANCE`].
    pub fn nearest(kind: DimensionKind, value: f64) -> Result<Self, DescriptorError> {
        Self::nearest_with_tolerance(kind, value, DIMENSION_TOLERANCE)
    }

    /// Snap `value` to the nearest table entry within an explicit tolerance,
    /// inclusive at the boundary.
    pub fn nearest_with_tolerance(
        kind: DimensionKind,
        value: f64,
        tolerance: f64,
    ) -> Result<Self, DescriptorError> {
        let mut best: Option<(f64, f64)> = None;
        for &entry in kind.table() {
            let delta = (value - entry).abs();
            if delta <= tolerance && best.is_none_or(|(b, _)| delta < b) {
                best = Some((delta, entry));
            }
        }
        match best {
            Some((_, entry)) => Ok(Self(entry)),
            None => Err(DescriptorError::DimensionOutOfRange {
                kind,
                value,
                tolerance,
            }),
        }
    }

    /// The snapped table value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Every table entry has one decimal; keep it in the canonical key.
        write!(f, "{:.1}", self.0)
    }
}

// ── Options ──────────────────────────────────────────────────────────────

/// Machine option flags plus free-form option words.
///
/// The five known flags have fixed token spellings; anything else is kept
/// verbatim in `other` so serialization stays lossless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    /// Opposed second head (`opp`).
    pub opposed: bool,
    /// Tilting head (`tilt`).
    pub tilting: bool,
    /// Turntable (`turn`).
    pub turntable: bool,
    /// Dual carriage (`dual`).
    pub dual_carriage: bool,
    /// Piece lifter (`lift`).
    pub lifter: bool,
    /// Unrecognized option words, kept verbatim.
    pub other: BTreeSet<String>,
}

impl OptionSet {
    /// Record one option word.
    pub fn insert(&mut self, word: &str) {
        match word {
            "opp" => self.opposed = true,
            "tilt" => self.tilting = true,
            "turn" => self.turntable = true,
            "dual" => self.dual_carriage = true,
            "lift" => self.lifter = true,
            _ => {
                self.other.insert(word.to_string());
            }
        }
    }

    /// True when the set contains `word`, matched exactly as given.
    pub fn contains(&self, word: &str) -> bool {
        match word {
            "opp" => self.opposed,
            "tilt" => self.tilting,
            "turn" => self.turntable,
            "dual" => self.dual_carriage,
            "lift" => self.lifter,
            _ => self.other.contains(word),
        }
    }

    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        !(self.opposed || self.tilting || self.turntable || self.dual_carriage || self.lifter)
            && self.other.is_empty()
    }

    /// Option tokens in canonical order: known flags first, then the
    /// free-form words sorted.
    pub fn tokens(&self) -> Vec<&str> {
        let flags = [
            (self.opposed, "opp"),
            (self.tilting, "tilt"),
            (self.turntable, "turn"),
            (self.dual_carriage, "dual"),
            (self.lifter, "lift"),
        ];
        let mut out: Vec<&str> = flags
            .into_iter()
            .filter_map(|(set, tok)| set.then_some(tok))
            .collect();
        out.extend(self.other.iter().map(String::as_str));
        out
    }
}

// ── MachineDescriptor ────────────────────────────────────────────────────

/// A parsed machine identification string.
///
/// Immutable value type; resolution takes it by reference. Structural
/// equality, and `parse(x.to_string()) == x` for every descriptor this
/// parser can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineDescriptor {
    /// Machine family.
    pub family: Family,
    /// Cut-bridge dimension; strato families only.
    pub cut_bridge: Option<Dimension>,
    /// Align-span dimension; strato families only.
    pub align_span: Option<Dimension>,
    /// Option flags and words.
    pub options: OptionSet,
}

impl MachineDescriptor {
    /// Parse a descriptor string.
    ///
    /// The input is lowercased first. The leading alphabetic run picks the
    /// family; the first two decimal numbers become cut-bridge and
    /// align-span dimensions (ignored for float families); every remaining
    /// token joined by punctuation becomes an option word. Numeric tokens
    /// past the second dimension slot are kept as free-form option words.
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        let lower = input.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let mut scan = Scan::new(&lower);
        let family_token = scan.take_while(|b| b.is_ascii_alphabetic());
        let family = Family::classify(family_token)
            .ok_or_else(|| DescriptorError::UnknownFamily(lower.clone()))?;

        let mut first_number = None;
        let mut second_number = None;
        let mut options = OptionSet::default();
        while let Some(b) = scan.peek() {
            if !is_token_byte(b) {
                scan.bump();
                continue;
            }
            let token = scan.take_while(is_token_byte);
            match parse_decimal(token) {
                Some(value) if first_number.is_none() => first_number = Some(value),
                Some(value) if second_number.is_none() => second_number = Some(value),
                Some(_) if !family.is_strato() => {}
                _ => options.insert(token),
            }
        }

        let (cut_bridge, align_span) = if family.is_strato() {
            (
                first_number
                    .map(|v| Dimension::nearest(DimensionKind::CutBridge, v))
                    .transpose()?,
                second_number
                    .map(|v| Dimension::nearest(DimensionKind::AlignSpan, v))
                    .transpose()?,
            )
        } else {
            (None, None)
        };

        Ok(Self {
            family,
            cut_bridge,
            align_span,
            options,
        })
    }
}

impl FromStr for MachineDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MachineDescriptor {
    /// Canonical form: `family[-cut[/align]][-(opt,opt,…)]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family.id())?;
        if self.family.is_strato()
            && let Some(cut) = self.cut_bridge
        {
            write!(f, "-{cut}")?;
            if let Some(align) = self.align_span {
                write!(f, "/{align}")?;
            }
        }
        if !self.options.is_empty() {
            write!(f, "-({})", self.options.tokens().join(","))?;
        }
        Ok(())
    }
}

// ── Parsing internals ────────────────────────────────────────────────────

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.'
}

/// Parse a plain decimal token: digits with at most one dot, no sign, no
/// exponent. Anything else is an option word.
fn parse_decimal(token: &str) -> Option<f64> {
    let mut dots = 0;
    let mut digits = 0;
    for b in token.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    token.parse().ok()
}

/// Minimal byte cursor for descriptor strings.
///
/// Descriptor inputs are short and line-free, so this stays much simpler
/// than the file scanner: no line tracking, no error positions.
struct Scan<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            text,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }
}
