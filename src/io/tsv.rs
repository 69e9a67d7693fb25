//! TSV reading, which wraps the [`csv`] crate configured for tab-delimited
//! genomic files.

use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::InputFile;
use crate::error::SeqBrowseError;

/// Build a TSV reader over any stream which ignores `#` comment lines and
/// tolerates rows with differing column counts.
pub fn tsv_reader_from<R: Read>(stream: R) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(stream)
}

/// Build a TSV reader over a plaintext or gzip-compressed file.
pub fn build_tsv_reader(
    filepath: impl Into<PathBuf>,
) -> Result<Reader<Box<dyn Read>>, SeqBrowseError> {
    let stream: Box<dyn Read> = Box::new(InputFile::new(filepath).reader()?);
    Ok(tsv_reader_from(stream))
}

/// Parse a BED column where `.` marks a missing value.
pub fn parse_bed_missing<T>(field: &str) -> Result<Option<T>, SeqBrowseError>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    if field == "." || field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<T>()
        .map(Some)
        .map_err(|e| SeqBrowseError::ParseError(format!("'{}': {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_skips_comments() {
        let data = "# header\nchr1\t1\t2\nchr2\t3\t4\textra\n";
        let mut reader = tsv_reader_from(data.as_bytes());
        let rows: Vec<_> = reader.records().map(|r| r.unwrap().len()).collect();
        assert_eq!(rows, vec![3, 4]);
    }

    #[test]
    fn test_parse_bed_missing() {
        assert_eq!(parse_bed_missing::<f64>(".").unwrap(), None);
        assert_eq!(parse_bed_missing::<f64>("2.5").unwrap(), Some(2.5));
        assert!(parse_bed_missing::<f64>("abc").is_err());
    }
}
