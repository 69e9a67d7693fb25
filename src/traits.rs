//! Traits used by the seqbrowse library.
//!

use crate::Position;

/// The [`GenericRange`] trait defines common functionality for all range types.
///
/// Ranges in this library are 1-based and end-inclusive, as displayed to the
/// user; conversion from 0-based formats happens in the readers. Half-open
/// types such as [`Bin`](crate::bins::Bin) and
/// [`Span`](crate::collapse::Span) do not implement it.
pub trait GenericRange {
    fn start(&self) -> Position;
    fn end(&self) -> Position;

    /// The number of bases covered by this range.
    fn width(&self) -> Position {
        if self.end() < self.start() {
            return 0;
        }
        self.end() - self.start() + 1
    }

    /// Calculate how many basepairs overlap this range and other.
    fn overlap_width<R: GenericRange>(&self, other: &R) -> Position {
        let overlap_start = std::cmp::max(self.start(), other.start());
        let overlap_end = std::cmp::min(self.end(), other.end());
        if overlap_start > overlap_end {
            return 0;
        }
        overlap_end - overlap_start + 1
    }

    /// Return a tuple of the range created by an overlap with another range; `None` if no overlap.
    fn overlap_range<R: GenericRange>(&self, other: &R) -> Option<(Position, Position)> {
        let overlap_start = std::cmp::max(self.start(), other.start());
        let overlap_end = std::cmp::min(self.end(), other.end());

        if overlap_start <= overlap_end {
            Some((overlap_start, overlap_end))
        } else {
            None
        }
    }

    /// Return a tuple version of this range.
    fn as_tuple(&self) -> (Position, Position) {
        (self.start(), self.end())
    }
}
