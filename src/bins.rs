//! Fixed-width bin aggregation of signal records.
//!
//! Bins are built over a window aligned to multiples of the bin size, then
//! filled from scored sub-interval records by averaging. Scaling into
//! [`ScaleMode::Cpm`] or [`ScaleMode::Bpm`] happens when a reader hands the
//! bins out, never while filling.

use serde::{Deserialize, Serialize};

use crate::{
    config::Settings, error::SeqBrowseError, location::GenomicLocation, traits::GenericRange,
    Position,
};

/// The bin sizes a view may choose between, smallest first.
pub const BIN_SIZES: [Position; 6] = [16, 64, 256, 1024, 4096, 16384];

/// The most bins a single location may be split into under auto sizing.
pub const MAX_BINS_PER_VIEW: Position = 1000;

/// A fixed-width genomic sub-interval holding an aggregated signal value.
///
/// Bins use a 1-based `start` and an exclusive `end`, so consecutive bins of
/// one aggregation pass satisfy `next.start == prev.end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: Position,
    pub end: Position,
    pub value: f64,
    pub count: u32,
}

impl Bin {
    pub fn new(start: Position, end: Position, value: f64) -> Self {
        Self {
            start,
            end,
            value,
            count: 0,
        }
    }

    pub fn empty(start: Position, end: Position) -> Self {
        Self::new(start, end, 0.0)
    }
}

/// A raw scored sub-interval from a signal source, 1-based and end-inclusive
/// like every other [`GenericRange`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalRecord {
    pub start: Position,
    pub end: Position,
    pub score: f64,
}

impl SignalRecord {
    pub fn new(start: Position, end: Position, score: f64) -> Self {
        Self { start, end, score }
    }
}

impl GenericRange for SignalRecord {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// How raw read counts are scaled when returned to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Raw values.
    #[default]
    Count,
    /// Counts per million reads in the track.
    #[serde(rename = "CPM")]
    Cpm,
    /// Bins per million, using a scale factor precomputed by the backend.
    #[serde(rename = "BPM")]
    Bpm,
}

/// Per-track normalization constants needed by [`ScaleMode::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaleFactors {
    pub total_reads: u64,
    pub bpm_scale_factor: f64,
}

impl ScaleMode {
    /// Scale a single value.
    pub fn apply(&self, value: f64, factors: &ScaleFactors) -> f64 {
        match self {
            ScaleMode::Count => value,
            ScaleMode::Cpm => {
                if factors.total_reads == 0 {
                    0.0
                } else {
                    value / factors.total_reads as f64 * 1e6
                }
            }
            ScaleMode::Bpm => value * factors.bpm_scale_factor,
        }
    }

    /// Scale every bin in place.
    pub fn apply_to_bins(&self, bins: &mut [Bin], factors: &ScaleFactors) {
        if *self == ScaleMode::Count {
            return;
        }
        for bin in bins.iter_mut() {
            bin.value = self.apply(bin.value, factors);
        }
    }
}

/// Build empty bins covering `[floor(start/bs)*bs, ceil(end/bs)*bs)`, each
/// `bin_size` wide with 1-based starts.
///
/// # Errors
/// Returns [`SeqBrowseError::InvalidBinSize`] if `bin_size` is zero.
pub fn make_bins(
    location: &GenomicLocation,
    bin_size: Position,
) -> Result<Vec<Bin>, SeqBrowseError> {
    if bin_size == 0 {
        return Err(SeqBrowseError::InvalidBinSize);
    }
    let start = (location.start() / bin_size) * bin_size;
    let end = location.end().div_ceil(bin_size).saturating_mul(bin_size);

    let bins = (start..end)
        .step_by(bin_size as usize)
        .map(|b| Bin::empty(b + 1, (b + 1).saturating_add(bin_size)))
        .collect();
    Ok(bins)
}

/// The 1-based inclusive window spanned by the bins [`make_bins`] builds for
/// `location`. Readers query this window so the aligned bins at either end
/// see all their records.
pub fn aligned_window(
    location: &GenomicLocation,
    bin_size: Position,
) -> Result<GenomicLocation, SeqBrowseError> {
    let bins = make_bins(location, bin_size)?;
    match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => Ok(GenomicLocation::new(
            location.chr(),
            first.start,
            last.end - 1,
        )),
        _ => Ok(location.clone()),
    }
}

/// Accumulate `records` into `bins` and average each bin by its sample count.
///
/// The owning bin of a record is `floor((record.start - window_start) / bs)`,
/// where the window starts at the first bin. Records starting before the
/// window belong to the first bin; records past the last bin are ignored.
pub fn fill_bins<I>(bins: &mut [Bin], records: I)
where
    I: IntoIterator<Item = SignalRecord>,
{
    let (window_start, bin_size) = match bins.first() {
        Some(first) => (first.start, first.end - first.start),
        None => return,
    };
    if bin_size == 0 {
        return;
    }

    for record in records {
        let index = (record.start.saturating_sub(window_start) / bin_size) as usize;
        if let Some(bin) = bins.get_mut(index) {
            bin.value += record.score;
            bin.count += 1;
        }
    }

    for bin in bins.iter_mut() {
        if bin.count > 0 {
            bin.value /= bin.count as f64;
        }
    }
}

/// Make and fill bins for one location in a single step.
pub fn aggregate<I>(
    location: &GenomicLocation,
    bin_size: Position,
    records: I,
) -> Result<Vec<Bin>, SeqBrowseError>
where
    I: IntoIterator<Item = SignalRecord>,
{
    let mut bins = make_bins(location, bin_size)?;
    fill_bins(&mut bins, records);
    Ok(bins)
}

/// The smallest size in [`BIN_SIZES`] splitting the location into at most
/// [`MAX_BINS_PER_VIEW`] bins, else the largest size.
pub fn auto_bin_size(location: &GenomicLocation) -> Position {
    let width = location.width();
    BIN_SIZES
        .iter()
        .copied()
        .find(|size| width <= size * MAX_BINS_PER_VIEW)
        .unwrap_or(BIN_SIZES[BIN_SIZES.len() - 1])
}

/// The bin size to use for each location, honoring the configured
/// auto sizing or fixed size.
pub fn bin_sizes(locations: &[GenomicLocation], settings: &Settings) -> Vec<Position> {
    locations
        .iter()
        .map(|location| {
            if settings.seqs.bins.auto_size {
                auto_bin_size(location)
            } else {
                settings.seqs.bins.size
            }
        })
        .collect()
}

/// Convert backend `[start, end, count]` triples (1-based start, inclusive
/// end) to bins, scaling by `mode`. Ends are made exclusive so consecutive
/// bins join.
pub fn bins_from_counts(
    counts: &[(Position, Position, f64)],
    mode: ScaleMode,
    factors: &ScaleFactors,
) -> Vec<Bin> {
    counts
        .iter()
        .map(|&(start, end, reads)| Bin {
            start,
            end: end.saturating_add(1),
            value: mode.apply(reads, factors),
            count: 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::test_utilities::{random_location, random_signal_records};

    #[test]
    fn test_make_bins_scenario() {
        let loc: GenomicLocation = "chr3:1001-2000".parse().unwrap();
        let bins = make_bins(&loc, 100).unwrap();
        assert_eq!(bins.len(), 10);
        let starts: Vec<_> = bins.iter().map(|b| b.start).collect();
        let expected: Vec<Position> = (0..10).map(|i| 1001 + i * 100).collect();
        assert_eq!(starts, expected);
        assert!(bins.iter().all(|b| b.value == 0.0 && b.count == 0));
    }

    #[test]
    fn test_make_bins_zero_size() {
        let loc = GenomicLocation::new("chr1", 1, 100);
        assert!(matches!(
            make_bins(&loc, 0),
            Err(SeqBrowseError::InvalidBinSize)
        ));
    }

    #[test]
    fn test_make_bins_near_max_position() {
        let loc = GenomicLocation::new("chr1", Position::MAX - 100, Position::MAX);
        let bins = make_bins(&loc, 64).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.last().unwrap().end, Position::MAX);
        for pair in bins.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_aligned_window() {
        let loc = GenomicLocation::new("chr2", 1050, 1210);
        let window = aligned_window(&loc, 100).unwrap();
        assert_eq!((window.chr(), window.start(), window.end()), ("chr2", 1001, 1300));

        // every record of the first bin lies inside the window
        let records = vec![SignalRecord::new(1010, 1020, 2.0), SignalRecord::new(1060, 1070, 4.0)];
        let inside: Vec<_> = records
            .into_iter()
            .filter(|r| r.overlap_width(&window) > 0)
            .collect();
        let bins = aggregate(&loc, 100, inside).unwrap();
        assert_eq!((bins[0].value, bins[0].count), (3.0, 2));
    }

    #[test]
    fn test_make_bins_cover_random() {
        for _ in 0..200 {
            let loc = random_location();
            for &bs in &BIN_SIZES {
                let bins = make_bins(&loc, bs).unwrap();
                let lo = (loc.start() / bs) * bs;
                let hi = loc.end().div_ceil(bs) * bs;
                assert_eq!(bins.first().unwrap().start, lo + 1);
                assert_eq!(bins.last().unwrap().end, hi + 1);
                for pair in bins.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                    assert_eq!(pair[0].end - pair[0].start, bs);
                }
                assert_eq!(bins.len() as Position, (hi - lo) / bs);
            }
        }
    }

    #[test]
    fn test_fill_bins_average() {
        let loc = GenomicLocation::new("chr1", 1, 300);
        let mut bins = make_bins(&loc, 100).unwrap();
        let records = vec![
            SignalRecord::new(1, 10, 2.0),
            SignalRecord::new(50, 60, 4.0),
            SignalRecord::new(250, 260, 9.0),
            SignalRecord::new(5000, 5010, 100.0),
        ];
        fill_bins(&mut bins, records);
        assert_eq!(bins[0].value, 3.0);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].value, 0.0);
        assert_eq!(bins[2].value, 9.0);
    }

    #[test]
    fn test_fill_bins_random_counts() {
        let loc = GenomicLocation::new("chr2", 10_001, 20_000);
        let bs = 64;
        let records = random_signal_records(&loc, 500);
        let bins = aggregate(&loc, bs, records.iter().copied()).unwrap();
        let total: u32 = bins.iter().map(|b| b.count).sum();
        assert_eq!(total as usize, records.len());
    }

    #[test]
    fn test_scale_modes() {
        let factors = ScaleFactors {
            total_reads: 2_000_000,
            bpm_scale_factor: 0.5,
        };
        assert_eq!(ScaleMode::Count.apply(10.0, &factors), 10.0);
        assert_eq!(ScaleMode::Cpm.apply(10.0, &factors), 5.0);
        assert_eq!(ScaleMode::Bpm.apply(10.0, &factors), 5.0);
        assert_eq!(ScaleMode::Cpm.apply(10.0, &ScaleFactors::default()), 0.0);
    }

    #[test]
    fn test_auto_bin_size() {
        let cases = [
            (1_000, 16),
            (16_000, 16),
            (16_100, 64),
            (64_000, 64),
            (200_000, 256),
            (1_000_000, 1024),
            (4_000_000, 4096),
            (16_384_000, 16384),
            (100_000_000, 16384),
        ];
        for (width, expected) in cases {
            let loc = GenomicLocation::new("chr1", 1, width);
            assert_eq!(auto_bin_size(&loc), expected, "width {}", width);
        }
    }

    #[test]
    fn test_bin_sizes_from_settings() {
        let locs = vec![
            GenomicLocation::new("chr1", 1, 1_000),
            GenomicLocation::new("chr1", 1, 1_000_000),
        ];
        let mut settings = Settings::default();
        assert_eq!(bin_sizes(&locs, &settings), vec![16, 1024]);
        settings.seqs.bins.auto_size = false;
        assert_eq!(bin_sizes(&locs, &settings), vec![64, 64]);
    }

    #[test]
    fn test_bins_from_counts() {
        let counts = vec![(1, 64, 3.0), (65, 128, 5.0)];
        let factors = ScaleFactors {
            total_reads: 0,
            bpm_scale_factor: 2.0,
        };
        let bins = bins_from_counts(&counts, ScaleMode::Bpm, &factors);
        assert_eq!(bins[0].end, bins[1].start);
        assert_eq!(bins[1].value, 10.0);
    }
}
