//! Genomic locations: 1-based, inclusive coordinate windows on a chromosome.
//!
//! A [`GenomicLocation`] always resolves to something valid: starts are
//! clamped to 1, reversed coordinates are swapped, and chromosome names gain
//! a `chr` prefix. Readers backed by 0-based half-open formats (BED, bigWig,
//! bigBed) convert at their boundary with [`GenomicLocation::from_zero_based`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{error::SeqBrowseError, traits::GenericRange, Position};

/// The largest end coordinate a view may be navigated to.
pub const MAX_VIEW_END: Position = 300_000_000;

/// The smallest window width, in base pairs, a view may be navigated to.
pub const MIN_VIEW_WIDTH: Position = 10;

/// Nucleotide strand of a location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
    #[default]
    #[serde(rename = ".")]
    Unknown,
}

impl FromStr for Strand {
    type Err = SeqBrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." | "" => Ok(Strand::Unknown),
            _ => Err(SeqBrowseError::ParseError(format!(
                "invalid strand '{}': must be either '+', '-', or '.'",
                s
            ))),
        }
    }
}

/// Add the `chr` prefix to a chromosome name if it lacks one.
pub fn format_chr(chr: &str) -> String {
    let chr = chr.trim();
    if chr.starts_with("chr") {
        chr.to_string()
    } else {
        format!("chr{}", chr)
    }
}

/// A 1-based, inclusive genomic window `chr:start-end`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLocation")]
pub struct GenomicLocation {
    chr: String,
    start: Position,
    end: Position,
    #[serde(default)]
    strand: Strand,
}

/// Wire form of a location, normalized on the way in.
#[derive(Deserialize)]
struct RawLocation {
    chr: String,
    start: i64,
    end: i64,
    #[serde(default)]
    strand: Strand,
}

impl From<RawLocation> for GenomicLocation {
    fn from(raw: RawLocation) -> Self {
        GenomicLocation::from_signed(&raw.chr, raw.start, raw.end).with_strand(raw.strand)
    }
}

impl GenomicLocation {
    /// Create a new location, normalizing the coordinates so that
    /// `1 <= start <= end`.
    pub fn new(chr: &str, start: Position, end: Position) -> Self {
        Self::from_signed(chr, start as i64, end as i64)
    }

    /// Create a location from possibly negative or swapped coordinates.
    pub fn from_signed(chr: &str, start: i64, end: i64) -> Self {
        let lo = start.min(end).max(1);
        let hi = start.max(end).max(lo);
        let clamp = |x: i64| x.min(Position::MAX as i64) as Position;
        Self {
            chr: format_chr(chr),
            start: clamp(lo),
            end: clamp(hi),
            strand: Strand::Unknown,
        }
    }

    /// Create a location from 0-based, half-open coordinates (BED, bigWig).
    pub fn from_zero_based(chr: &str, start0: Position, end: Position) -> Self {
        Self::new(chr, start0.saturating_add(1), end)
    }

    /// Create a location from a 0-based, half-open feature interval (BED,
    /// bigBed). A zero-length interval marks an insertion point and covers
    /// the one base after `start0`.
    ///
    /// # Errors
    /// Returns [`SeqBrowseError::InvalidGenomicRange`] if `start0 > end` and
    /// [`SeqBrowseError::ParseError`] if `start0` has no 1-based equivalent.
    pub fn from_feature_interval(
        chr: &str,
        start0: Position,
        end: Position,
    ) -> Result<Self, SeqBrowseError> {
        if start0 > end {
            return Err(SeqBrowseError::InvalidGenomicRange(start0, end));
        }
        let start = start0.checked_add(1).ok_or_else(|| {
            SeqBrowseError::ParseError(format!("feature start {} is out of range", start0))
        })?;
        Ok(Self::new(chr, start, end.max(start)))
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// The 0-based half-open `(start, end)` pair of this location.
    pub fn zero_based(&self) -> (Position, Position) {
        (self.start - 1, self.end)
    }

    /// The overlapping portion of two locations, or `None` if they do
    /// not overlap or are on different chromosomes.
    pub fn overlap(&self, other: &GenomicLocation) -> Option<GenomicLocation> {
        if self.chr != other.chr {
            return None;
        }
        let max_start = self.start.max(other.start);
        let min_end = self.end.min(other.end);
        if min_end < max_start {
            return None;
        }
        Some(GenomicLocation::new(&self.chr, max_start, min_end))
    }

    /// Whether this location touches `other` at all.
    pub fn overlaps(&self, other: &GenomicLocation) -> bool {
        self.overlap(other).is_some()
    }

    /// Fraction of `other` covered by this location.
    pub fn overlap_fraction(&self, other: &GenomicLocation) -> f64 {
        match self.overlap(other) {
            Some(o) => o.width() as f64 / other.width() as f64,
            None => 0.0,
        }
    }

    /// Whether this location lies entirely within `other`.
    pub fn within(&self, other: &GenomicLocation) -> bool {
        self.chr == other.chr && self.start >= other.start && self.end <= other.end
    }

    /// The smallest location spanning both `self` and `other`.
    pub fn join(&self, other: &GenomicLocation) -> GenomicLocation {
        GenomicLocation::new(
            &self.chr,
            self.start.min(other.start),
            self.end.max(other.end),
        )
    }

    /// Pad a location on both sides, clamping at 1.
    pub fn padded(&self, padding5p: Position, padding3p: Position) -> GenomicLocation {
        GenomicLocation::from_signed(
            &self.chr,
            self.start as i64 - padding5p as i64,
            self.end as i64 + padding3p as i64,
        )
        .with_strand(self.strand)
    }

    /// Clamp a navigation target so the view always shows at least
    /// [`MIN_VIEW_WIDTH`] bases and never runs past [`MAX_VIEW_END`].
    pub fn clamp_for_view(&self) -> GenomicLocation {
        let start = self.start.clamp(1, MAX_VIEW_END - MIN_VIEW_WIDTH);
        let end = self
            .end
            .min(MAX_VIEW_END)
            .max(start.saturating_add(MIN_VIEW_WIDTH));
        GenomicLocation {
            chr: self.chr.clone(),
            start,
            end,
            strand: self.strand,
        }
    }

    /// Human friendly representation with thousands separators.
    pub fn formatted(&self) -> String {
        format!(
            "{}:{}-{}",
            self.chr,
            thousands(self.start),
            thousands(self.end)
        )
    }
}

fn thousands(x: Position) -> String {
    let digits = x.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl GenericRange for GenomicLocation {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl fmt::Display for GenomicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}

impl FromStr for GenomicLocation {
    type Err = SeqBrowseError;

    /// Parse `chr3:187,441,954-187,466,041`. Thousands separators are
    /// ignored and `-` may stand in for `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SeqBrowseError::InvalidLocation(s.to_string());
        let standardized = s.trim().replace(',', "").replace(':', "-");

        let mut fields = standardized.rsplitn(3, '-');
        let end = fields.next().ok_or_else(invalid)?;
        let start = fields.next().ok_or_else(invalid)?;
        let chr = fields.next().ok_or_else(invalid)?;

        if !chr.starts_with("chr") || chr.len() <= 3 {
            return Err(invalid());
        }
        let parse = |x: &str| -> Result<Position, SeqBrowseError> {
            if x.is_empty() || !x.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            x.parse::<Position>().map_err(|_| invalid())
        };
        let start = parse(start)?;
        let end = parse(end)?;
        Ok(GenomicLocation::new(chr, start, end))
    }
}

/// Parse a location, returning `None` for strings that are not locations
/// (e.g. a gene symbol to be searched for instead).
pub fn parse_location(s: &str) -> Option<GenomicLocation> {
    s.parse().ok()
}
