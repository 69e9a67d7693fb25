//! Core of a multi-track genome browser: coordinate axes, signal binning,
//! series collapsing, feature layout, track readers and the track group
//! store.

pub mod axis;
pub mod bins;
pub mod collapse;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod layout;
pub mod location;
pub mod ranges;
pub mod readers;
pub mod test_utilities;
pub mod tracks;
pub mod traits;
pub mod view;

pub type Position = u32;

pub mod prelude {
    pub use crate::axis::Axis;
    pub use crate::bins::{Bin, ScaleFactors, ScaleMode, SignalRecord};
    pub use crate::collapse::SeriesPoint;
    pub use crate::config::Settings;
    pub use crate::error::SeqBrowseError;
    pub use crate::features::{BedFeature, FeatureTree, GenomicFeature};
    pub use crate::layout::LayoutPolicy;
    pub use crate::location::{GenomicLocation, Strand, MAX_VIEW_END};
    pub use crate::readers::{EmptyReader, Reader, TrackReader};
    pub use crate::traits::GenericRange;
    pub use crate::tracks::{
        Track, TrackAction, TrackGroup, TrackGroupState, TrackGroupStore, TrackKind,
    };
    pub use crate::view::{FetchTicket, ViewState};
    pub use crate::Position;
}
