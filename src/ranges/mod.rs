//! Range containers and the per-chromosome [`FeatureIndex`].
//!
//! A [`FeatureIndex`] follows the ranges-plus-data-container layout: each
//! chromosome holds a [`COITrees`] interval tree whose ranges carry indices
//! into one shared `Vec` of [`BedFeature`]s.

use ::coitrees::GenericInterval;
use genomap::GenomeMap;
use indexmap::IndexMap;

use crate::{
    error::SeqBrowseError, features::BedFeature, location::GenomicLocation,
    traits::GenericRange, Position,
};

pub mod coitrees;

pub use self::coitrees::COITrees;

/// [`RangeIndexed`] is a range with a valid index to a data element in the
/// data container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RangeIndexed {
    pub start: Position,
    pub end: Position,
    pub index: usize,
}

impl RangeIndexed {
    /// Create a new 1-based, end-inclusive range.
    pub fn new(start: Position, end: Position, index: usize) -> Self {
        Self { start, end, index }
    }
}

impl GenericRange for RangeIndexed {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// An in-memory interval index over features, built once and queried per
/// view.
pub struct FeatureIndex {
    ranges: GenomeMap<COITrees>,
    data: Vec<BedFeature>,
}

impl std::fmt::Debug for FeatureIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureIndex")
            .field("sequences", &self.ranges.names())
            .field("features", &self.data.len())
            .finish()
    }
}

impl FeatureIndex {
    /// Index `features`, grouping them by chromosome in encounter order.
    pub fn new(features: Vec<BedFeature>) -> Result<Self, SeqBrowseError> {
        let mut by_seqname: IndexMap<String, Vec<RangeIndexed>> = IndexMap::new();
        for (index, feature) in features.iter().enumerate() {
            by_seqname
                .entry(feature.location.chr().to_string())
                .or_default()
                .push(RangeIndexed::new(feature.start(), feature.end(), index));
        }

        let mut ranges = GenomeMap::new();
        for (seqname, seq_ranges) in by_seqname.iter() {
            ranges.insert(seqname, COITrees::new(seq_ranges)?)?;
        }
        Ok(Self {
            ranges,
            data: features,
        })
    }

    /// All features overlapping `location`, ordered by start then end. A
    /// chromosome with no features is an empty result.
    pub fn query(&self, location: &GenomicLocation) -> Vec<&BedFeature> {
        let trees = match self.ranges.get(location.chr()) {
            Some(trees) => trees,
            None => return Vec::new(),
        };
        let mut indices = Vec::new();
        trees.query(location.start(), location.end(), |node| {
            indices.push(*node.metadata())
        });
        let mut hits: Vec<&BedFeature> = indices.into_iter().map(|i| &self.data[i]).collect();
        hits.sort_by_key(|f| (f.start(), f.end()));
        hits
    }

    /// The chromosome names present in the index.
    pub fn seqnames(&self) -> Vec<String> {
        self.ranges.names()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(chr: &str, start: Position, end: Position, name: &str) -> BedFeature {
        BedFeature::new(GenomicLocation::new(chr, start, end), name)
    }

    #[test]
    fn test_feature_index_query() {
        let index = FeatureIndex::new(vec![
            feature("chr1", 500, 600, "c"),
            feature("chr1", 1, 100, "a"),
            feature("chr1", 90, 200, "b"),
            feature("chr2", 1, 100, "d"),
        ])
        .unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.seqnames(), vec!["chr1".to_string(), "chr2".to_string()]);

        let hits = index.query(&GenomicLocation::new("chr1", 50, 550));
        let names: Vec<_> = hits.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        assert!(index.query(&GenomicLocation::new("chr1", 201, 499)).is_empty());
        assert!(index.query(&GenomicLocation::new("chrY", 1, 1000)).is_empty());
    }
}
