//! Vertical layout of gene tracks.
//!
//! Transcripts are assigned rows according to a [`LayoutPolicy`]:
//!
//!  - [`LayoutPolicy::Dense`]: everything on row 0.
//!  - [`LayoutPolicy::Full`]: one row per transcript, in encounter order.
//!  - [`LayoutPolicy::Pack`]: greedy interval coloring in pixel space. Each
//!    transcript's span is widened on its label side by the label width and
//!    placed on the lowest row free across the whole span.
//!
//! Pack is first-fit, not minimal, and costs O(transcripts × pixel width).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{axis::Axis, features::FeatureTree, traits::GenericRange};

/// Pixel width allowed per label character.
pub const CHAR_WIDTH: f64 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPolicy {
    Dense,
    Pack,
    #[default]
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneLayoutOptions {
    /// Height of a single transcript glyph.
    pub transcript_height: f64,
    /// Vertical gap between rows.
    pub gap: f64,
    pub char_width: f64,
}

impl Default for GeneLayoutOptions {
    fn default() -> Self {
        Self {
            transcript_height: 15.0,
            gap: 3.0,
            char_width: CHAR_WIDTH,
        }
    }
}

impl GeneLayoutOptions {
    pub fn row_height(&self) -> f64 {
        self.transcript_height + self.gap
    }
}

/// Where a transcript was placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    pub row: usize,
    pub y: f64,
}

/// The result of laying out one gene track.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneLayout {
    /// Keyed by `(gene index, transcript index)`.
    pub slots: IndexMap<(usize, usize), Slot>,
    pub height: f64,
}

impl GeneLayout {
    /// Vertical pixel offset of a transcript.
    pub fn offset(&self, gene: usize, transcript: usize) -> Option<f64> {
        self.slots.get(&(gene, transcript)).map(|s| s.y)
    }

    pub fn row(&self, gene: usize, transcript: usize) -> Option<usize> {
        self.slots.get(&(gene, transcript)).map(|s| s.row)
    }

    /// Number of rows used.
    pub fn num_rows(&self) -> usize {
        self.slots.values().map(|s| s.row + 1).max().unwrap_or(0)
    }
}

/// Lay out every transcript of `tree` for display on `xax`.
pub fn layout_genes(
    tree: &FeatureTree,
    xax: &Axis,
    policy: LayoutPolicy,
    options: &GeneLayoutOptions,
) -> GeneLayout {
    let row_height = options.row_height();
    let slot = |row: usize| Slot {
        row,
        y: row as f64 * row_height,
    };
    let mut layout = GeneLayout::default();

    match policy {
        LayoutPolicy::Dense => {
            for (key, _) in tree.transcripts() {
                layout.slots.insert(key, slot(0));
            }
            layout.height = row_height;
        }
        LayoutPolicy::Full => {
            for (row, (key, _)) in tree.transcripts().enumerate() {
                layout.slots.insert(key, slot(row));
            }
            layout.height = layout.slots.len() as f64 * row_height;
        }
        LayoutPolicy::Pack => {
            let columns = xax.length().ceil().max(1.0) as usize;
            let mut depths: Vec<HashSet<usize>> = vec![HashSet::new(); columns];
            let mut max_row = 0;

            for (key, transcript) in tree.transcripts() {
                let allowance = (transcript.label_len() as f64 * options.char_width) as i64;
                let (x1, x2) = label_span(
                    xax,
                    transcript.location.start() as f64,
                    transcript.location.end() as f64,
                    allowance,
                    columns,
                );

                let row = (0..=max_row + 1)
                    .find(|row| (x1..=x2).all(|x| !depths[x].contains(row)))
                    .unwrap_or(max_row + 1);
                for column in depths.iter_mut().take(x2 + 1).skip(x1) {
                    column.insert(row);
                }
                max_row = max_row.max(row);
                layout.slots.insert(key, slot(row));
            }

            layout.height = if layout.slots.is_empty() {
                0.0
            } else {
                (max_row + 1) as f64 * row_height
            };
        }
    }
    layout
}

/// The clamped pixel columns `[x1, x2]` occupied by a feature and its label.
/// The label sits before the feature's genomic start: to the left on a
/// forward axis and to the right on a reversed one.
fn label_span(xax: &Axis, start: f64, end: f64, allowance: i64, columns: usize) -> (usize, usize) {
    let px_start = xax.domain_to_range(start).floor() as i64;
    let px_end = xax.domain_to_range(end).floor() as i64;
    let (x1, x2) = if xax.is_reversed() {
        (px_end, px_start + allowance)
    } else {
        (px_start - allowance, px_end)
    };
    let last = columns.saturating_sub(1) as i64;
    let x1 = x1.clamp(0, last) as usize;
    let x2 = x2.clamp(0, last) as usize;
    (x1.min(x2), x2)
}

/// Height of a BED track group: the first track's height when collapsed
/// into one band, otherwise the sum of all of them.
pub fn bed_track_height<I>(heights: I, collapsed: bool) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut heights = heights.into_iter();
    if collapsed {
        heights.next().unwrap_or(0.0)
    } else {
        heights.sum()
    }
}
