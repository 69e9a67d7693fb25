//! bigWig and bigBed files, read through `bigtools`.
//!
//! Both formats store 0-based, half-open intervals. A 1-based inclusive
//! query `[start, end]` is sent as `[start - 1, end)` and every returned
//! record is shifted back with [`GenomicLocation::from_zero_based`], or
//! [`GenomicLocation::from_feature_interval`] for bigBed entries. Signal
//! queries cover the whole [`aligned_window`] of the requested bins.

use bigtools::{BBIRead, GenericBBIRead};
use std::fs::File;
use std::io::{Read, Seek};

use crate::{
    bins::{aggregate, aligned_window, Bin, ScaleMode, SignalRecord},
    error::SeqBrowseError,
    features::BedFeature,
    io::tsv::parse_bed_missing,
    location::GenomicLocation,
    Position,
};

use super::TrackReader;

/// Any seekable byte source a binary file can be read from.
pub trait BinarySource: Read + Seek + Send {}

impl<T: Read + Seek + Send> BinarySource for T {}

/// Resolves a track's url or file path to a byte source. The host supplies
/// an implementation for remote urls (e.g. one issuing HTTP range requests).
pub trait SourceOpener {
    fn open(&self, source: &str) -> Result<Box<dyn BinarySource>, SeqBrowseError>;
}

/// Opens sources as paths on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFiles;

impl SourceOpener for LocalFiles {
    fn open(&self, source: &str) -> Result<Box<dyn BinarySource>, SeqBrowseError> {
        Ok(Box::new(File::open(source)?))
    }
}

struct CachedSignal {
    location: GenomicLocation,
    bin_size: Position,
    bins: Vec<Bin>,
}

/// A reader over one bigWig or bigBed file. The bins of the last
/// `(location, bin size)` request are cached.
pub struct BinaryIndexedReader<R> {
    name: String,
    bbi: GenericBBIRead<R>,
    cache: Option<CachedSignal>,
}

impl<R> std::fmt::Debug for BinaryIndexedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.bbi {
            GenericBBIRead::BigWig(_) => "bigWig",
            GenericBBIRead::BigBed(_) => "bigBed",
        };
        f.debug_struct("BinaryIndexedReader")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

impl BinaryIndexedReader<File> {
    /// Open a bigWig or bigBed file on disk.
    pub fn from_path(name: impl Into<String>, path: &str) -> Result<Self, SeqBrowseError> {
        BinaryIndexedReader::open(name, File::open(path)?)
    }
}

impl<R: Read + Seek> BinaryIndexedReader<R> {
    /// Read the header of a bigWig or bigBed from `read`.
    pub fn open(name: impl Into<String>, read: R) -> Result<Self, SeqBrowseError> {
        let bbi = GenericBBIRead::open(read)
            .map_err(|e| SeqBrowseError::BinaryIndexedOpen(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            bbi,
            cache: None,
        })
    }

    pub fn is_bigwig(&self) -> bool {
        matches!(self.bbi, GenericBBIRead::BigWig(_))
    }

    /// The chromosome names in the file's header.
    pub fn seqnames(&self) -> Vec<String> {
        self.bbi.chroms().iter().map(|c| c.name.clone()).collect()
    }

    fn has_chrom(&self, chr: &str) -> bool {
        self.bbi.chroms().iter().any(|c| c.name == chr)
    }

    /// Raw signal records over `location`, in 1-based coordinates.
    pub fn records(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<SignalRecord>, SeqBrowseError> {
        if !self.has_chrom(location.chr()) {
            return Ok(Vec::new());
        }
        let (start0, end) = location.zero_based();
        let name = self.name.clone();
        let bigwig = match &mut self.bbi {
            GenericBBIRead::BigWig(b) => b,
            GenericBBIRead::BigBed(_) => return Ok(Vec::new()),
        };
        let values = bigwig
            .get_interval(location.chr(), start0, end)
            .map_err(|e| SeqBrowseError::fetch(name.clone(), e))?;
        values
            .map(|value| {
                let value = value.map_err(|e| SeqBrowseError::fetch(name.clone(), e))?;
                Ok(SignalRecord::new(
                    value.start + 1,
                    value.end,
                    value.value as f64,
                ))
            })
            .collect()
    }

    /// Features over `location` from a bigBed. The first three of the extra
    /// columns are read as name, score and strand.
    pub fn bed_entries(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        if !self.has_chrom(location.chr()) {
            return Ok(Vec::new());
        }
        let (start0, end) = location.zero_based();
        let name = self.name.clone();
        let bigbed = match &mut self.bbi {
            GenericBBIRead::BigBed(b) => b,
            GenericBBIRead::BigWig(_) => return Ok(Vec::new()),
        };
        let entries = bigbed
            .get_interval(location.chr(), start0, end)
            .map_err(|e| SeqBrowseError::fetch(name.clone(), e))?;

        entries
            .map(|entry| {
                let entry = entry.map_err(|e| SeqBrowseError::fetch(name.clone(), e))?;
                bed_entry_feature(location.chr(), entry.start, entry.end, &entry.rest)
            })
            .collect()
    }
}

/// Build a feature from one bigBed entry: a 0-based interval plus the
/// tab-separated extra columns.
fn bed_entry_feature(
    chr: &str,
    start0: Position,
    end: Position,
    rest: &str,
) -> Result<BedFeature, SeqBrowseError> {
    let mut rest = rest.split('\t');
    let feature_name = rest.next().unwrap_or_default().to_string();
    let score = match rest.next() {
        Some(field) => parse_bed_missing::<f64>(field)?,
        None => None,
    };
    let mut loc = GenomicLocation::from_feature_interval(chr, start0, end)?;
    if let Some(strand) = rest.next().and_then(|s| s.parse().ok()) {
        loc = loc.with_strand(strand);
    }
    let mut feature = BedFeature::new(loc, feature_name);
    feature.score = score;
    feature.tags = rest.map(|s| s.to_string()).collect();
    Ok(feature)
}

impl<R: Read + Seek> TrackReader for BinaryIndexedReader<R> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Binned bigWig signal. The file's values are used unscaled, so `mode`
    /// is not applied.
    async fn signal(
        &mut self,
        location: &GenomicLocation,
        bin_size: Position,
        _mode: ScaleMode,
    ) -> Result<Vec<Bin>, SeqBrowseError> {
        if let Some(cached) = &self.cache {
            if cached.location == *location && cached.bin_size == bin_size {
                log::debug!("'{}': cached bins for {}:{}", self.name, location, bin_size);
                return Ok(cached.bins.clone());
            }
        }
        let records = self.records(&aligned_window(location, bin_size)?)?;
        let bins = aggregate(location, bin_size, records)?;
        self.cache = Some(CachedSignal {
            location: location.clone(),
            bin_size,
            bins: bins.clone(),
        });
        Ok(bins)
    }

    async fn features(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        self.bed_entries(location)
    }
}
