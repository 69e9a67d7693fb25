//! Linear mapping between a genomic (or value) domain and a pixel range.
//!
//! An [`Axis`] maps the domain `[a, b]` onto `[0, length]` pixels. A domain
//! with `a > b` is a mirrored axis, which is how reversed (minus strand)
//! display is expressed: pixel 0 then corresponds to the *higher* genomic
//! coordinate. Axes are values; every setter returns a modified copy.
//!
//! The Y-axis variant is produced with [`Axis::inverted`], where the domain
//! minimum sits at pixel `length`, i.e. the bottom of a track.

use crate::error::SeqBrowseError;

/// Default domain and pixel length of a freshly built axis.
pub const DEFAULT_DOMAIN: (f64, f64) = (0.0, 100.0);
pub const DEFAULT_LENGTH: f64 = 500.0;

/// A tick position and its label.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    domain: (f64, f64),
    length: f64,
    clip: bool,
    inverted: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN,
            length: DEFAULT_LENGTH,
            clip: true,
            inverted: false,
        }
    }
}

impl Axis {
    pub fn new() -> Self {
        Self::default()
    }

    /// A Y-axis: values increase upward, so the domain start maps to the
    /// bottom of the drawing area.
    pub fn y_axis() -> Self {
        Self::default().inverted(true)
    }

    /// Set the domain `[a, b]`. `a > b` yields a mirrored axis.
    ///
    /// # Errors
    /// Returns [`SeqBrowseError::DegenerateAxis`] if `a == b` (or either end
    /// is not finite), since no mapping can be defined.
    pub fn set_domain(&self, a: f64, b: f64) -> Result<Axis, SeqBrowseError> {
        if a == b || !a.is_finite() || !b.is_finite() {
            return Err(SeqBrowseError::DegenerateAxis(a));
        }
        Ok(Axis {
            domain: (a, b),
            ..self.clone()
        })
    }

    /// Set the pixel length of the axis.
    ///
    /// # Errors
    /// Returns [`SeqBrowseError::DegenerateAxis`] if `length` is not a
    /// positive finite number.
    pub fn set_length(&self, length: f64) -> Result<Axis, SeqBrowseError> {
        if !(length.is_finite() && length > 0.0) {
            return Err(SeqBrowseError::DegenerateAxis(length));
        }
        Ok(Axis {
            length,
            ..self.clone()
        })
    }

    /// Toggle clipping of mapped values to the axis bounds.
    pub fn set_clip(&self, clip: bool) -> Axis {
        Axis {
            clip,
            ..self.clone()
        }
    }

    /// Toggle Y-axis style inversion.
    pub fn inverted(&self, inverted: bool) -> Axis {
        Axis {
            inverted,
            ..self.clone()
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Whether the domain runs from high to low coordinates.
    pub fn is_reversed(&self) -> bool {
        self.domain.0 > self.domain.1
    }

    fn domain_min_max(&self) -> (f64, f64) {
        let (a, b) = self.domain;
        (a.min(b), a.max(b))
    }

    /// Map a domain value to its pixel coordinate.
    pub fn domain_to_range(&self, x: f64) -> f64 {
        let (a, b) = self.domain;
        let mut n = (x - a) / (b - a) * self.length;
        if self.clip {
            n = n.clamp(0.0, self.length);
        }
        if self.inverted {
            self.length - n
        } else {
            n
        }
    }

    /// Map a pixel coordinate back to the domain; the inverse of
    /// [`Axis::domain_to_range`].
    pub fn range_to_domain(&self, x: f64) -> f64 {
        let (a, b) = self.domain;
        let x = if self.inverted { self.length - x } else { x };
        let mut v = a + x / self.length * (b - a);
        if self.clip {
            let (lo, hi) = self.domain_min_max();
            v = v.clamp(lo, hi);
        }
        v
    }

    /// Ticks over the domain at a round interval, about `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<Tick> {
        let lim = self.domain_min_max();
        let interval = auto_tick_interval(lim, count);
        make_ticks(lim, interval)
    }
}

/// Pick a round tick interval (1, 2 or 5 times a power of ten) giving
/// roughly `count` intervals across `lim`.
pub fn auto_tick_interval(lim: (f64, f64), count: usize) -> f64 {
    let span = (lim.1 - lim.0).abs();
    if span == 0.0 || count == 0 {
        return 1.0;
    }
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Expand `lim` outwards to the nearest multiples of `interval`.
pub fn auto_lim(lim: (f64, f64), interval: f64) -> (f64, f64) {
    if interval <= 0.0 {
        return lim;
    }
    (
        (lim.0 / interval).floor() * interval,
        (lim.1 / interval).ceil() * interval,
    )
}

/// Ticks at every multiple of `interval` inside `lim`.
pub fn make_ticks(lim: (f64, f64), interval: f64) -> Vec<Tick> {
    if interval <= 0.0 {
        return Vec::new();
    }
    let first = (lim.0 / interval).ceil() as i64;
    let last = (lim.1 / interval).floor() as i64;
    (first..=last)
        .map(|i| {
            let value = i as f64 * interval;
            Tick {
                value,
                label: format_tick(value),
            }
        })
        .collect()
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.6}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
