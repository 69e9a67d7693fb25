use coitrees::{BasicCOITree, GenericInterval, IntervalNode, IntervalTree};

use crate::{error::SeqBrowseError, traits::GenericRange, Position};

use super::RangeIndexed;

impl GenericInterval<usize> for RangeIndexed {
    fn first(&self) -> i32 {
        self.start as i32
    }
    fn last(&self) -> i32 {
        self.end as i32
    }
    fn metadata(&self) -> &usize {
        &self.index
    }
}

impl GenericRange for IntervalNode<usize, usize> {
    fn start(&self) -> Position {
        self.first() as Position
    }
    fn end(&self) -> Position {
        self.last() as Position
    }
}

/// A [`coitrees::BasicCOITree`] interval tree for a single sequence's ranges,
/// where each range carries the index of its feature in a data container.
pub struct COITrees {
    pub(crate) ranges: BasicCOITree<usize, usize>,
}

impl std::fmt::Debug for COITrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("COITrees")
            .field("number of ranges:", &self.ranges.len())
            .finish()
    }
}

/// The largest coordinate a [`COITrees`] can hold, since coitrees uses `i32`.
pub const MAX_COITREES_POSITION: Position = i32::MAX as Position;

impl COITrees {
    /// Build the tree from 1-based, end-inclusive indexed ranges.
    pub fn new(ranges: &[RangeIndexed]) -> Result<Self, SeqBrowseError> {
        if let Some(bad) = ranges
            .iter()
            .find(|r| r.start > r.end || r.end > MAX_COITREES_POSITION)
        {
            return Err(SeqBrowseError::InvalidGenomicRange(bad.start, bad.end));
        }
        Ok(Self {
            ranges: BasicCOITree::new(ranges),
        })
    }

    /// Query this range container for a particular end-inclusive range, and
    /// call a visit function on all overlapping ranges.
    pub fn query<F>(&self, start: Position, end: Position, visit: F)
    where
        F: FnMut(&IntervalNode<usize, usize>),
    {
        let first = start.min(MAX_COITREES_POSITION) as i32;
        let last = end.min(MAX_COITREES_POSITION) as i32;
        self.ranges.query(first, last, visit)
    }

    /// Count the ranges overlapping `[start, end]`.
    pub fn count_overlaps(&self, start: Position, end: Position) -> usize {
        let first = start.min(MAX_COITREES_POSITION) as i32;
        let last = end.min(MAX_COITREES_POSITION) as i32;
        self.ranges.query_count(first, last)
    }

    /// Return the number of ranges in this container.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Return whether this container is empty (contains no ranges).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
