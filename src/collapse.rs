//! Collapse aggregated bins into a minimal vertex series for line and area
//! rendering.
//!
//! The pipeline is:
//!
//!  1. [`collapse_spans`]: merge contiguous, epsilon-equal bins into spans and
//!     cover coordinate gaps with zero-valued spacers.
//!  2. [`smooth_spans`]: optionally lift interior zero spans towards their
//!     neighbors.
//!  3. [`to_points`]: expand each span into a step of two vertices, map them
//!     to pixels, and pin both ends of the series to the baseline.
//!
//! [`collapse`] runs all three.

use crate::{axis::Axis, bins::Bin, Position};

/// Two values closer than this are treated as equal when merging.
pub const EPSILON: f64 = f64::EPSILON;

/// A run of equal-valued signal, start inclusive and end exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    pub value: f64,
}

impl Span {
    pub fn new(start: Position, end: Position, value: f64) -> Self {
        Self { start, end, value }
    }

    fn zero(start: Position, end: Position) -> Self {
        Self::new(start, end, 0.0)
    }

    fn is_zero(&self) -> bool {
        self.value.abs() < EPSILON
    }
}

impl From<&Bin> for Span {
    fn from(bin: &Bin) -> Self {
        Span::new(bin.start, bin.end, bin.value)
    }
}

impl From<&Span> for Bin {
    fn from(span: &Span) -> Self {
        Bin::new(span.start, span.end, span.value)
    }
}

/// A renderable vertex: genomic coordinates, pixel coordinates and the
/// underlying value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    pub start: Position,
    pub end: Position,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Merge bins into the fewest spans that describe the same step function.
///
/// Gaps between bins become zero-valued spacers. A zero-valued span
/// followed by a gap simply grows over the gap, so the output never holds
/// two adjacent equal spans and collapsing it again is a no-op.
pub fn collapse_spans(bins: &[Bin]) -> Vec<Span> {
    let mut iter = bins.iter();
    let mut current = match iter.next() {
        Some(first) => Span::from(first),
        None => return Vec::new(),
    };
    let mut spans = Vec::new();

    for bin in iter {
        if bin.start > current.end {
            if current.is_zero() {
                current.end = bin.start;
            } else {
                let spacer = Span::zero(current.end, bin.start);
                spans.push(current);
                current = spacer;
            }
        }

        if bin.start == current.end && (bin.value - current.value).abs() < EPSILON {
            current.end = bin.end;
        } else {
            spans.push(current);
            current = Span::from(bin);
        }
    }
    spans.push(current);
    spans
}

/// Replace each interior zero span with the mean of its neighbors scaled by
/// `factor`. A factor of 0 (or less) leaves the spans untouched.
pub fn smooth_spans(spans: &mut [Span], factor: f64) {
    if factor <= 0.0 || spans.len() < 3 {
        return;
    }
    let original: Vec<f64> = spans.iter().map(|s| s.value).collect();
    for i in 1..spans.len() - 1 {
        if original[i] == 0.0 {
            spans[i].value = (original[i - 1] + original[i + 1]) * 0.5 * factor;
        }
    }
}

/// Expand spans to stepped vertices in pixel space, with baseline copies of
/// the first and last vertex added at each end.
pub fn to_points(spans: &[Span], xax: &Axis, yax: &Axis) -> Vec<SeriesPoint> {
    if spans.is_empty() {
        return Vec::new();
    }
    let vertex = |at: Position, value: f64| SeriesPoint {
        start: at,
        end: at,
        x: xax.domain_to_range(at as f64),
        y: yax.domain_to_range(value),
        value,
    };

    let mut points = Vec::with_capacity(spans.len() * 2 + 2);
    for span in spans {
        points.push(vertex(span.start, span.value));
        points.push(vertex(span.end, span.value));
    }

    let baseline = yax.domain_to_range(0.0);
    let to_baseline = |p: &SeriesPoint| SeriesPoint {
        y: baseline,
        value: 0.0,
        ..*p
    };
    let head = points.first().map(to_baseline);
    let tail = points.last().map(to_baseline);
    if let (Some(head), Some(tail)) = (head, tail) {
        points.insert(0, head);
        points.push(tail);
    }
    points
}

/// Collapse, smooth and map `bins` to a renderable vertex series.
pub fn collapse(bins: &[Bin], xax: &Axis, yax: &Axis, smoothing_factor: f64) -> Vec<SeriesPoint> {
    let mut spans = collapse_spans(bins);
    smooth_spans(&mut spans, smoothing_factor);
    to_points(&spans, xax, yax)
}

/// The shared y-axis maximum across several tracks' bins: the largest
/// value rounded up, and at least `ymin`.
pub fn y_max<'a, I>(series: I, ymin: f64) -> f64
where
    I: IntoIterator<Item = &'a [Bin]>,
{
    let max = series
        .into_iter()
        .flat_map(|bins| bins.iter().map(|b| b.value))
        .fold(0.0_f64, f64::max);
    max.ceil().max(ymin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::test_utilities::random_bins;

    fn axes() -> (Axis, Axis) {
        let xax = Axis::new().set_domain(0.0, 400.0).unwrap().set_length(400.0).unwrap();
        let yax = Axis::y_axis().set_domain(0.0, 10.0).unwrap().set_length(50.0).unwrap();
        (xax, yax)
    }

    #[test]
    fn test_collapse_with_gap() {
        let bins = vec![
            Bin::new(0, 100, 5.0),
            Bin::new(100, 200, 5.0),
            Bin::new(300, 400, 5.0),
        ];
        let spans = collapse_spans(&bins);
        assert_eq!(
            spans,
            vec![
                Span::new(0, 200, 5.0),
                Span::new(200, 300, 0.0),
                Span::new(300, 400, 5.0),
            ]
        );

        let (xax, yax) = axes();
        let points = to_points(&spans, &xax, &yax);
        assert_eq!(points.len(), 8);
        let first = points.first().unwrap();
        let last = points.last().unwrap();
        assert_eq!(first.value, 0.0);
        assert_eq!(first.y, 50.0);
        assert_eq!(last.value, 0.0);
        assert_eq!(last.y, 50.0);
        assert_eq!(first.x, 0.0);
        assert_eq!(last.x, 400.0);
        assert_eq!(points[1].y, 25.0);
    }

    #[test]
    fn test_empty() {
        let (xax, yax) = axes();
        assert!(collapse(&[], &xax, &yax, 0.5).is_empty());
    }

    #[test]
    fn test_zero_span_grows_over_gap() {
        let bins = vec![
            Bin::new(1, 11, 0.0),
            Bin::new(21, 31, 0.0),
            Bin::new(31, 41, 2.0),
        ];
        let spans = collapse_spans(&bins);
        assert_eq!(spans, vec![Span::new(1, 31, 0.0), Span::new(31, 41, 2.0)]);
    }

    #[test]
    fn test_spacer_absorbs_following_zero() {
        let bins = vec![Bin::new(1, 11, 3.0), Bin::new(21, 31, 0.0)];
        let spans = collapse_spans(&bins);
        assert_eq!(spans, vec![Span::new(1, 11, 3.0), Span::new(11, 31, 0.0)]);
    }

    #[test]
    fn test_smoothing() {
        let mut spans = vec![
            Span::new(0, 10, 4.0),
            Span::new(10, 20, 0.0),
            Span::new(20, 30, 2.0),
            Span::new(30, 40, 0.0),
        ];
        smooth_spans(&mut spans, 0.5);
        assert_eq!(spans[1].value, 1.5);
        // only interior spans are smoothed
        assert_eq!(spans[3].value, 0.0);

        let mut unchanged = spans.clone();
        unchanged[1].value = 0.0;
        let before = unchanged.clone();
        smooth_spans(&mut unchanged, 0.0);
        assert_eq!(unchanged, before);
    }

    #[test]
    fn test_idempotent_random() {
        for _ in 0..100 {
            let bins = random_bins(200, 64);
            let once = collapse_spans(&bins);
            let as_bins: Vec<Bin> = once.iter().map(Bin::from).collect();
            let twice = collapse_spans(&as_bins);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_baseline_random() {
        let (xax, yax) = axes();
        for _ in 0..100 {
            let bins = random_bins(50, 8);
            let points = collapse(&bins, &xax, &yax, 0.5);
            assert_eq!(points.first().unwrap().value, 0.0);
            assert_eq!(points.last().unwrap().value, 0.0);
            assert_eq!(points.first().unwrap().y, yax.domain_to_range(0.0));
        }
    }

    #[test]
    fn test_reversed_x() {
        let xax = Axis::new().set_domain(400.0, 0.0).unwrap().set_length(400.0).unwrap();
        let (_, yax) = axes();
        let points = collapse(&[Bin::new(0, 100, 1.0)], &xax, &yax, 0.0);
        assert_eq!(points[0].x, 400.0);
        assert_eq!(points.last().unwrap().x, 300.0);
    }

    #[test]
    fn test_y_max() {
        let a = vec![Bin::new(1, 2, 3.2), Bin::new(2, 3, 1.0)];
        let b = vec![Bin::new(1, 2, 7.5)];
        assert_eq!(y_max([a.as_slice(), b.as_slice()], 1.0), 8.0);
        assert_eq!(y_max(std::iter::empty::<&[Bin]>(), 1.0), 1.0);
    }
}
