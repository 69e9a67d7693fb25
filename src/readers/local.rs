use std::path::PathBuf;

use crate::{
    bins::{Bin, ScaleMode},
    error::SeqBrowseError,
    features::BedFeature,
    io::{read_bed, BedIterator},
    location::GenomicLocation,
    ranges::FeatureIndex,
    Position,
};

use super::TrackReader;

/// Features from a user-supplied BED file, indexed once in memory.
#[derive(Debug)]
pub struct LocalIndexedReader {
    name: String,
    index: FeatureIndex,
}

impl LocalIndexedReader {
    pub fn new(name: impl Into<String>, features: Vec<BedFeature>) -> Result<Self, SeqBrowseError> {
        Ok(Self {
            name: name.into(),
            index: FeatureIndex::new(features)?,
        })
    }

    /// Parse and index a BED file on disk (plain or gzip). A malformed
    /// record fails the whole file.
    pub fn from_path(
        name: impl Into<String>,
        filepath: impl Into<PathBuf>,
    ) -> Result<Self, SeqBrowseError> {
        let features = BedIterator::new(filepath)?.collect::<Result<Vec<_>, _>>()?;
        Self::new(name, features)
    }

    /// Parse and index uploaded file contents (plain or gzip).
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SeqBrowseError> {
        Self::new(name, read_bed(bytes)?)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl TrackReader for LocalIndexedReader {
    fn name(&self) -> &str {
        &self.name
    }

    async fn signal(
        &mut self,
        _location: &GenomicLocation,
        _bin_size: Position,
        _mode: ScaleMode,
    ) -> Result<Vec<Bin>, SeqBrowseError> {
        Ok(Vec::new())
    }

    async fn features(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        Ok(self.index.query(location).into_iter().cloned().collect())
    }
}
