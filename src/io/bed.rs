//! BED parsing into [`BedFeature`]s.
//!
//! BED files are 0-based and half-open; every record is converted to a
//! 1-based inclusive [`GenomicLocation`] as it is parsed. The first three
//! columns are required; name (4), score (5) and strand (6) are read when
//! present and any further columns are kept as tags. UCSC `track` and
//! `browser` lines are skipped along with `#` comments.

use csv::{StringRecord, StringRecordsIntoIter};
use std::io::Read;
use std::path::PathBuf;

use super::{
    file::bytes_reader,
    tsv::{build_tsv_reader, parse_bed_missing, tsv_reader_from},
};
use crate::{
    error::SeqBrowseError,
    features::BedFeature,
    location::{GenomicLocation, Strand},
    Position,
};

/// A parsing iterator over a (possibly gzip-compressed) BED file.
pub struct BedIterator {
    records: StringRecordsIntoIter<Box<dyn Read>>,
}

impl std::fmt::Debug for BedIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedIterator").finish_non_exhaustive()
    }
}

impl BedIterator {
    /// Creates a parsing iterator over a BED file on disk.
    pub fn new(filepath: impl Into<PathBuf>) -> Result<Self, SeqBrowseError> {
        let reader = build_tsv_reader(filepath)?;
        Ok(Self {
            records: reader.into_records(),
        })
    }

    /// Creates a parsing iterator over in-memory file contents.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            records: tsv_reader_from(bytes_reader(bytes)).into_records(),
        }
    }
}

impl Iterator for BedIterator {
    type Item = Result<BedFeature, SeqBrowseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            if is_header(&record) {
                continue;
            }
            return Some(parse_bed_record(&record));
        }
    }
}

fn is_header(record: &StringRecord) -> bool {
    match record.get(0) {
        None => true,
        Some(first) => {
            let first = first.trim();
            first.is_empty() || first.starts_with("track") || first.starts_with("browser")
        }
    }
}

/// Parse one BED row into a feature with 1-based coordinates.
pub fn parse_bed_record(record: &StringRecord) -> Result<BedFeature, SeqBrowseError> {
    if record.len() < 3 {
        let line = record.iter().collect::<Vec<_>>().join("\t");
        return Err(SeqBrowseError::BedlikeTooFewColumns(line));
    }
    let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

    let seqname = field(0);
    let start: Position = field(1).parse()?;
    let end: Position = field(2).parse()?;

    let name = parse_bed_missing::<String>(field(3))?.unwrap_or_default();
    let score = parse_bed_missing::<f64>(field(4))?;
    let strand = match record.get(5) {
        Some(s) => s.trim().parse::<Strand>()?,
        None => Strand::Unknown,
    };
    let tags = record.iter().skip(6).map(|s| s.to_string()).collect();

    let location = GenomicLocation::from_feature_interval(seqname, start, end)?.with_strand(strand);
    Ok(BedFeature {
        location,
        name,
        score,
        tags,
    })
}

/// Parse every record of a BED file, failing on the first malformed row.
pub fn read_bed(bytes: Vec<u8>) -> Result<Vec<BedFeature>, SeqBrowseError> {
    BedIterator::from_bytes(bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    const BED: &str = "track name=peaks\n# comment\nchr1\t0\t100\tpeak1\t5.5\t+\nchr1\t150\t160\n2\t10\t20\tpeak3\t.\n";

    #[test]
    fn test_parse_bed() {
        let features = read_bed(BED.as_bytes().to_vec()).unwrap();
        assert_eq!(features.len(), 3);

        let first = &features[0];
        assert_eq!(first.location, GenomicLocation::new("chr1", 1, 100));
        assert_eq!(first.location.strand(), Strand::Forward);
        assert_eq!(first.name, "peak1");
        assert_eq!(first.score, Some(5.5));

        assert_eq!(features[1].location.start(), 151);
        assert_eq!(features[1].name, "");
        assert_eq!(features[2].location.chr(), "chr2");
        assert_eq!(features[2].score, None);
    }

    #[test]
    fn test_too_few_columns() {
        let result = read_bed(b"chr1\t10\n".to_vec());
        assert!(matches!(
            result,
            Err(SeqBrowseError::BedlikeTooFewColumns(_))
        ));
    }

    #[test]
    fn test_bad_integer() {
        let result = read_bed(b"chr1\tten\t20\n".to_vec());
        assert!(matches!(result, Err(SeqBrowseError::ParseIntError(_))));
    }

    #[test]
    fn test_start_out_of_range() {
        let result = read_bed(b"chr1\t4294967295\t4294967295\n".to_vec());
        assert!(matches!(result, Err(SeqBrowseError::ParseError(_))));

        let result = read_bed(b"chr1\t20\t10\n".to_vec());
        assert!(matches!(
            result,
            Err(SeqBrowseError::InvalidGenomicRange(20, 10))
        ));
    }

    #[test]
    fn test_zero_length_record() {
        let features = read_bed(b"chr1\t150\t150\tins\n".to_vec()).unwrap();
        assert_eq!((features[0].start(), features[0].end()), (151, 151));
    }

    #[test]
    fn test_from_path_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let file = tempfile::NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        encoder.write_all(BED.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let count = BedIterator::new(file.path()).unwrap().count();
        assert_eq!(count, 3);
    }
}
