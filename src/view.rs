//! The current view: displayed locations, their bin sizes and the set of
//! tracks being fetched, with a generation counter guarding against stale
//! fetch results.
//!
//! Every change that invalidates in-flight fetches (navigation, a bin size
//! change, a different track set) bumps the generation. A fetch starts by
//! taking a [`FetchTicket`]; when it completes, [`ViewState::apply`] hands
//! the result back only if no such change happened in the meantime.
//!
//! ```
//! use seqbrowse::prelude::*;
//!
//! let settings = Settings::default();
//! let mut view = ViewState::from_settings(&settings).unwrap();
//! let ticket = view.ticket();
//! view.zoom(0.5, &settings);
//! assert_eq!(view.apply(&ticket, vec![1, 2, 3]), None);
//! ```

use crate::{
    axis::Axis,
    bins::bin_sizes,
    config::Settings,
    error::SeqBrowseError,
    location::GenomicLocation,
    tracks::{RenderPlan, TrackGroupState},
    traits::GenericRange,
    Position,
};

/// A drag selection narrower than this is ignored.
pub const MIN_ZOOM_SIZE_BP: Position = 1000;

/// Zooming by a factor never narrows a location below this width.
pub const MIN_ZOOM_WIDTH_BP: Position = 100;

/// What a fetch was started for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub locations: Vec<GenomicLocation>,
    pub bin_sizes: Vec<Position>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    locations: Vec<GenomicLocation>,
    bin_sizes: Vec<Position>,
    track_ids: Vec<String>,
    generation: u64,
}

impl ViewState {
    pub fn new(locations: Vec<GenomicLocation>, settings: &Settings) -> Self {
        let locations: Vec<GenomicLocation> =
            locations.iter().map(|l| l.clamp_for_view()).collect();
        Self {
            bin_sizes: bin_sizes(&locations, settings),
            locations,
            track_ids: Vec::new(),
            generation: 0,
        }
    }

    /// A view of the locations listed in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, SeqBrowseError> {
        let locations = settings
            .locations
            .iter()
            .map(|s| s.parse::<GenomicLocation>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(locations, settings))
    }

    pub fn locations(&self) -> &[GenomicLocation] {
        &self.locations
    }

    pub fn bin_sizes(&self) -> &[Position] {
        &self.bin_sizes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    /// Show `locations`, clamped to displayable bounds.
    pub fn navigate(&mut self, locations: Vec<GenomicLocation>, settings: &Settings) {
        self.locations = locations.iter().map(|l| l.clamp_for_view()).collect();
        self.bin_sizes = bin_sizes(&self.locations, settings);
        self.bump();
    }

    /// Recompute bin sizes after a settings change. Returns whether they
    /// changed.
    pub fn update_bin_sizes(&mut self, settings: &Settings) -> bool {
        let sizes = bin_sizes(&self.locations, settings);
        if sizes == self.bin_sizes {
            return false;
        }
        self.bin_sizes = sizes;
        self.bump();
        true
    }

    /// Track the ids of the tracks `state` displays. Returns whether the set
    /// changed.
    pub fn set_track_set(&mut self, state: &TrackGroupState) -> bool {
        let ids: Vec<String> = RenderPlan::new(state)
            .tracks()
            .map(|t| t.id.clone())
            .collect();
        if ids == self.track_ids {
            return false;
        }
        self.track_ids = ids;
        self.bump();
        true
    }

    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            locations: self.locations.clone(),
            bin_sizes: self.bin_sizes.clone(),
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// `Err(StaleResult)` if `ticket` has been superseded.
    pub fn check(&self, ticket: &FetchTicket) -> Result<(), SeqBrowseError> {
        if self.is_current(ticket) {
            Ok(())
        } else {
            Err(SeqBrowseError::StaleResult {
                ticket: ticket.generation,
                current: self.generation,
            })
        }
    }

    /// Return `result` if `ticket` is still current, otherwise drop it.
    pub fn apply<T>(&self, ticket: &FetchTicket, result: T) -> Option<T> {
        match self.check(ticket) {
            Ok(()) => Some(result),
            Err(e) => {
                log::debug!("discarding fetch result: {}", e);
                None
            }
        }
    }

    /// The x-axis of each location, mirrored when displaying the reverse
    /// strand.
    pub fn x_axes(&self, settings: &Settings) -> Result<Vec<Axis>, SeqBrowseError> {
        self.locations
            .iter()
            .map(|l| x_axis(l, settings))
            .collect()
    }

    /// Zoom column `column` to the genomic span under the pixel selection
    /// `[x1, x2]`. Selections of [`MIN_ZOOM_SIZE_BP`] or less are ignored.
    /// Returns whether the view changed.
    pub fn zoom_to_selection(
        &mut self,
        column: usize,
        x1: f64,
        x2: f64,
        settings: &Settings,
    ) -> Result<bool, SeqBrowseError> {
        let location = match self.locations.get(column) {
            Some(location) => location,
            None => return Ok(false),
        };
        let xax = x_axis(location, settings)?;
        let a = xax.range_to_domain(x1).round();
        let b = xax.range_to_domain(x2).round();
        let (lo, hi) = (a.min(b) as i64, a.max(b) as i64);
        if hi - lo <= MIN_ZOOM_SIZE_BP as i64 {
            return Ok(false);
        }
        let mut locations = self.locations.clone();
        locations[column] = GenomicLocation::from_signed(location.chr(), lo, hi);
        self.navigate(locations, settings);
        Ok(true)
    }

    /// Scale every location's width by `factor` around its midpoint.
    pub fn zoom(&mut self, factor: f64, settings: &Settings) {
        let locations = self
            .locations
            .iter()
            .map(|l| {
                let width = (l.width() as f64 * factor)
                    .max(MIN_ZOOM_WIDTH_BP as f64)
                    .round() as i64;
                let mid = (l.start() as f64 + l.end() as f64) / 2.0;
                let start = (mid - width as f64 / 2.0).round() as i64;
                GenomicLocation::from_signed(l.chr(), start, start + width)
            })
            .collect();
        self.navigate(locations, settings);
    }

    /// Shift every location by `bp` base pairs, keeping its width.
    pub fn pan(&mut self, bp: i64, settings: &Settings) {
        let locations = self
            .locations
            .iter()
            .map(|l| {
                let start = l.start() as i64;
                let shift = bp.max(1 - start);
                GenomicLocation::from_signed(l.chr(), start + shift, l.end() as i64 + shift)
            })
            .collect();
        self.navigate(locations, settings);
    }
}

/// The x-axis for one location at the configured plot width.
pub fn x_axis(location: &GenomicLocation, settings: &Settings) -> Result<Axis, SeqBrowseError> {
    let (start, end) = (location.start() as f64, location.end() as f64);
    let axis = if settings.reverse {
        Axis::new().set_domain(end, start)?
    } else {
        Axis::new().set_domain(start, end)?
    };
    axis.set_length(settings.plot.width)
}
