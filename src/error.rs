//! The [`SeqBrowseError`] `enum` definition and error messages.
//!
use crate::Position;
use genomap::GenomeMapError;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The [`SeqBrowseError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum SeqBrowseError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),

    // File parsing related errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Float parsing error: {0}")]
    ParseFloatError(#[from] ParseFloatError),
    #[error("Bed-like file has too few columns. The first three columns must be sequence name, and start and end positions.\nLine: {0}")]
    BedlikeTooFewColumns(String),
    #[error("TSV parsing error: {0}")]
    TsvParseError(#[from] csv::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Malformed input: {0}")]
    ParseError(String),

    // Location errors
    #[error("Could not parse '{0}' as a genomic location (expected e.g. 'chr1:1000-2000')")]
    InvalidLocation(String),
    #[error("Range invalid: start ({0}) must not be greater than end ({1})")]
    InvalidGenomicRange(Position, Position),
    #[error("Error encountered in genomap::GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),

    // Axis and binning errors
    #[error("Axis is degenerate: {0} cannot bound its domain or length")]
    DegenerateAxis(f64),
    #[error("Bin size must be greater than zero")]
    InvalidBinSize,

    // Reader errors
    #[error("Could not fetch data for track '{track}': {message}")]
    DataFetch { track: String, message: String },
    #[error("Could not open indexed binary file: {0}")]
    BinaryIndexedOpen(String),
    #[error("Fetch result for generation {ticket} is stale (current generation {current})")]
    StaleResult { ticket: u64, current: u64 },
}

impl SeqBrowseError {
    /// Wrap any displayable failure as a [`SeqBrowseError::DataFetch`] scoped to a track.
    pub fn fetch(track: impl Into<String>, message: impl std::fmt::Display) -> Self {
        SeqBrowseError::DataFetch {
            track: track.into(),
            message: message.to_string(),
        }
    }
}
