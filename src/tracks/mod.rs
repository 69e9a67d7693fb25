//! Tracks, track groups and the reducer-driven [`TrackGroupStore`].
//!
//! A [`Track`] is identified by its id and owns its display options. The
//! track's type is the `trackType` tag of its JSON form, so a track list
//! persisted by a host application deserializes directly:
//!
//! ```
//! use seqbrowse::prelude::*;
//!
//! let track: Track = serde_json::from_str(
//!     r#"{"id": "t1", "name": "Input", "trackType": "Seq", "publicId": "abc", "reads": 1000}"#,
//! ).unwrap();
//! assert!(track.is_signal());
//! assert_eq!(track.height(), 60.0);
//! ```
//!
//! Display fields this crate does not interpret (stroke, fill, fonts) are
//! carried through unchanged in each options struct's `extra` map.

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::Position;

pub mod export;
pub mod group;
pub mod plan;
pub mod store;

pub use export::{export_groups, import_groups};
pub use group::{TrackGroup, TrackGroupState};
pub use plan::RenderPlan;
pub use store::{track_reducer, TrackAction, TrackGroupStore};

/// Length of generated track and group ids.
pub const ID_LENGTH: usize = 21;

/// The `trackType` tag used for track groups in persisted JSON.
pub const TRACK_GROUP_TYPE: &str = "Track Group";

/// A random alphanumeric id.
pub fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Catalogue fields shared by tracks that come from the track database.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DbTrack {
    pub public_id: String,
    pub genome: String,
    pub platform: String,
    pub dataset: String,
    pub url: String,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalDisplayOptions {
    pub height: f64,
    pub ymax: f64,
    pub smooth: bool,
    pub auto_y: bool,
    pub use_global_y: bool,
    pub axes: Toggle,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SignalDisplayOptions {
    fn default() -> Self {
        Self {
            height: 60.0,
            ymax: 10.0,
            smooth: true,
            auto_y: true,
            use_global_y: true,
            axes: Toggle { show: true },
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggle {
    pub show: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Height {
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedDisplayOptions {
    pub height: f64,
    pub band: Height,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BedDisplayOptions {
    fn default() -> Self {
        Self {
            height: 24.0,
            band: Height { height: 12.0 },
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowStyle {
    #[default]
    #[serde(rename = "lines", alias = "Lines")]
    Lines,
    #[serde(rename = "filled", alias = "Filled")]
    Filled,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowOptions {
    pub show: bool,
    pub style: ArrowStyle,
    pub gap: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self {
            show: false,
            style: ArrowStyle::Lines,
            gap: 16.0,
            x: 2.0,
            y: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndArrowOptions {
    pub show: bool,
    pub first_transcript_only: bool,
}

impl Default for EndArrowOptions {
    fn default() -> Self {
        Self {
            show: true,
            first_transcript_only: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanonicalOptions {
    pub is_colored: bool,
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self { is_colored: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneSpacing {
    pub gap: f64,
}

impl Default for GeneSpacing {
    fn default() -> Self {
        Self { gap: 3.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneDisplayOptions {
    pub genes: GeneSpacing,
    pub transcripts: Height,
    pub arrows: ArrowOptions,
    pub end_arrows: EndArrowOptions,
    pub canonical: CanonicalOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for GeneDisplayOptions {
    fn default() -> Self {
        Self {
            genes: GeneSpacing::default(),
            transcripts: Height { height: 15.0 },
            arrows: ArrowOptions::default(),
            end_arrows: EndArrowOptions::default(),
            canonical: CanonicalOptions::default(),
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticks {
    pub show: bool,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleDisplayOptions {
    pub height: f64,
    pub auto_size: bool,
    pub bp: Position,
    pub caps: Ticks,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ScaleDisplayOptions {
    fn default() -> Self {
        Self {
            height: 30.0,
            auto_size: true,
            bp: 10000,
            caps: Ticks {
                show: true,
                height: 6.0,
            },
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulerDisplayOptions {
    pub height: f64,
    pub auto_size: bool,
    pub bp: Position,
    pub minor_ticks: Ticks,
    pub major_ticks: Ticks,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RulerDisplayOptions {
    fn default() -> Self {
        Self {
            height: 20.0,
            auto_size: true,
            bp: 10000,
            minor_ticks: Ticks {
                show: true,
                height: 6.0,
            },
            major_ticks: Ticks {
                show: true,
                height: 12.0,
            },
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDisplayOptions {
    pub height: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LocationDisplayOptions {
    fn default() -> Self {
        let mut extra = Map::new();
        extra.insert("font".to_string(), serde_json::json!({ "weight": 600 }));
        Self {
            height: 20.0,
            extra,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandStyle {
    #[default]
    Rounded,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSkip {
    pub on: bool,
    pub x: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CytobandLabels {
    pub show: bool,
    pub skip: LabelSkip,
}

impl Default for CytobandLabels {
    fn default() -> Self {
        Self {
            show: true,
            skip: LabelSkip { on: true, x: 50.0 },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CytobandsDisplayOptions {
    pub height: f64,
    pub band: Height,
    pub style: BandStyle,
    pub labels: CytobandLabels,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CytobandsDisplayOptions {
    fn default() -> Self {
        Self {
            height: 24.0,
            band: Height { height: 16.0 },
            style: BandStyle::Rounded,
            labels: CytobandLabels::default(),
            extra: Map::new(),
        }
    }
}

/// A sequencing signal track served by the bins endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeqTrack {
    #[serde(flatten)]
    pub db: DbTrack,
    #[serde(default)]
    pub reads: u64,
    #[serde(default)]
    pub stat: String,
    #[serde(default)]
    pub display_options: SignalDisplayOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBigWigTrack {
    #[serde(flatten)]
    pub db: DbTrack,
    #[serde(default)]
    pub scale: String,
    #[serde(default)]
    pub display_options: SignalDisplayOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedTrack {
    #[serde(flatten)]
    pub db: DbTrack,
    #[serde(default)]
    pub regions: u64,
    #[serde(default)]
    pub display_options: BedDisplayOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBigBedTrack {
    #[serde(flatten)]
    pub db: DbTrack,
    #[serde(default)]
    pub display_options: BedDisplayOptions,
}

/// A track backed by a user-supplied file. Its reader is held by the host
/// under the track's id and is never serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTrack<O> {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub display_options: O,
}

/// A track with no data source of its own beyond the view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilityTrack<O> {
    #[serde(default)]
    pub display_options: O,
}

/// The type of a track and its type-specific fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trackType")]
pub enum TrackKind {
    Seq(SeqTrack),
    #[serde(rename = "Remote BigWig")]
    RemoteBigWig(RemoteBigWigTrack),
    #[serde(rename = "Local BigWig")]
    LocalBigWig(LocalTrack<SignalDisplayOptions>),
    #[serde(rename = "BED")]
    Bed(BedTrack),
    #[serde(rename = "Remote BigBed")]
    RemoteBigBed(RemoteBigBedTrack),
    #[serde(rename = "Local BigBed")]
    LocalBigBed(LocalTrack<BedDisplayOptions>),
    #[serde(rename = "Local BED")]
    LocalBed(LocalTrack<BedDisplayOptions>),
    Gene(UtilityTrack<GeneDisplayOptions>),
    Scale(UtilityTrack<ScaleDisplayOptions>),
    Ruler(UtilityTrack<RulerDisplayOptions>),
    Location(UtilityTrack<LocationDisplayOptions>),
    Cytobands(UtilityTrack<CytobandsDisplayOptions>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: TrackKind,
}

impl Track {
    /// Create a track with a freshly generated id.
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: random_id(),
            name: name.into(),
            kind,
        }
    }

    /// Set the id, consuming and returning the track.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// A signal track for a database entry.
    pub fn seq(name: impl Into<String>, db: DbTrack, reads: u64) -> Self {
        Self::new(
            name,
            TrackKind::Seq(SeqTrack {
                db,
                reads,
                ..Default::default()
            }),
        )
    }

    /// A BED track for a database entry.
    pub fn bed(name: impl Into<String>, db: DbTrack) -> Self {
        Self::new(
            name,
            TrackKind::Bed(BedTrack {
                db,
                ..Default::default()
            }),
        )
    }

    /// A track for a local file, typed by its extension: `.bw`/`.bigWig`
    /// become bigWig, `.bb`/`.bigBed` bigBed and anything else BED.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = path.to_string_lossy().to_string();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let kind = match extension.as_str() {
            "bw" | "bigwig" => TrackKind::LocalBigWig(LocalTrack {
                file,
                display_options: SignalDisplayOptions::default(),
            }),
            "bb" | "bigbed" => TrackKind::LocalBigBed(LocalTrack {
                file,
                display_options: BedDisplayOptions::default(),
            }),
            _ => TrackKind::LocalBed(LocalTrack {
                file,
                display_options: BedDisplayOptions::default(),
            }),
        };
        Self::new(name, kind)
    }

    pub fn gene(name: impl Into<String>) -> Self {
        Self::new(name, TrackKind::Gene(UtilityTrack::default()))
    }

    pub fn scale() -> Self {
        Self::new("Scale", TrackKind::Scale(UtilityTrack::default()))
    }

    pub fn ruler() -> Self {
        Self::new("Ruler", TrackKind::Ruler(UtilityTrack::default()))
    }

    pub fn location() -> Self {
        Self::new("Location", TrackKind::Location(UtilityTrack::default()))
    }

    pub fn cytobands() -> Self {
        Self::new("Cytobands", TrackKind::Cytobands(UtilityTrack::default()))
    }

    /// The `trackType` tag.
    pub fn track_type(&self) -> &'static str {
        match &self.kind {
            TrackKind::Seq(_) => "Seq",
            TrackKind::RemoteBigWig(_) => "Remote BigWig",
            TrackKind::LocalBigWig(_) => "Local BigWig",
            TrackKind::Bed(_) => "BED",
            TrackKind::RemoteBigBed(_) => "Remote BigBed",
            TrackKind::LocalBigBed(_) => "Local BigBed",
            TrackKind::LocalBed(_) => "Local BED",
            TrackKind::Gene(_) => "Gene",
            TrackKind::Scale(_) => "Scale",
            TrackKind::Ruler(_) => "Ruler",
            TrackKind::Location(_) => "Location",
            TrackKind::Cytobands(_) => "Cytobands",
        }
    }

    /// Whether the track is backed by a local file and so cannot be exported.
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind,
            TrackKind::LocalBigWig(_) | TrackKind::LocalBigBed(_) | TrackKind::LocalBed(_)
        )
    }

    /// Whether the track draws a binned signal.
    pub fn is_signal(&self) -> bool {
        matches!(
            self.kind,
            TrackKind::Seq(_) | TrackKind::RemoteBigWig(_) | TrackKind::LocalBigWig(_)
        )
    }

    /// Whether the track draws BED-like feature bands.
    pub fn is_bed(&self) -> bool {
        matches!(
            self.kind,
            TrackKind::Bed(_)
                | TrackKind::RemoteBigBed(_)
                | TrackKind::LocalBigBed(_)
                | TrackKind::LocalBed(_)
        )
    }

    pub fn db(&self) -> Option<&DbTrack> {
        match &self.kind {
            TrackKind::Seq(t) => Some(&t.db),
            TrackKind::RemoteBigWig(t) => Some(&t.db),
            TrackKind::Bed(t) => Some(&t.db),
            TrackKind::RemoteBigBed(t) => Some(&t.db),
            _ => None,
        }
    }

    /// The database id of the track, if it has one.
    pub fn public_id(&self) -> Option<&str> {
        self.db().map(|db| db.public_id.as_str())
    }

    /// Signal display options, for signal tracks.
    pub fn signal_options(&self) -> Option<&SignalDisplayOptions> {
        match &self.kind {
            TrackKind::Seq(t) => Some(&t.display_options),
            TrackKind::RemoteBigWig(t) => Some(&t.display_options),
            TrackKind::LocalBigWig(t) => Some(&t.display_options),
            _ => None,
        }
    }

    /// Band display options, for BED-like tracks.
    pub fn bed_options(&self) -> Option<&BedDisplayOptions> {
        match &self.kind {
            TrackKind::Bed(t) => Some(&t.display_options),
            TrackKind::RemoteBigBed(t) => Some(&t.display_options),
            TrackKind::LocalBigBed(t) => Some(&t.display_options),
            TrackKind::LocalBed(t) => Some(&t.display_options),
            _ => None,
        }
    }

    /// The configured display height. Gene tracks size themselves from their
    /// layout and report 0 here.
    pub fn height(&self) -> f64 {
        match &self.kind {
            TrackKind::Seq(t) => t.display_options.height,
            TrackKind::RemoteBigWig(t) => t.display_options.height,
            TrackKind::LocalBigWig(t) => t.display_options.height,
            TrackKind::Bed(t) => t.display_options.height,
            TrackKind::RemoteBigBed(t) => t.display_options.height,
            TrackKind::LocalBigBed(t) => t.display_options.height,
            TrackKind::LocalBed(t) => t.display_options.height,
            TrackKind::Gene(_) => 0.0,
            TrackKind::Scale(t) => t.display_options.height,
            TrackKind::Ruler(t) => t.display_options.height,
            TrackKind::Location(t) => t.display_options.height,
            TrackKind::Cytobands(t) => t.display_options.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_json_defaults() {
        let track: Track = serde_json::from_str(
            r#"{"id": "t1", "name": "H3K27ac", "trackType": "Remote BigWig",
                "publicId": "p1", "genome": "hg19", "url": "https://x/y.bw",
                "scale": "BPM", "displayOptions": {"height": 80, "stroke": {"color": "red"}}}"#,
        )
        .unwrap();
        assert_eq!(track.track_type(), "Remote BigWig");
        assert_eq!(track.public_id(), Some("p1"));
        let options = track.signal_options().unwrap();
        assert_eq!(options.height, 80.0);
        assert_eq!(options.ymax, 10.0);
        assert!(options.extra.contains_key("stroke"));
        assert!(!track.is_local());
    }

    #[test]
    fn test_track_json_roundtrip_keeps_tag() {
        let track = Track::cytobands().with_id("c1");
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["trackType"], "Cytobands");
        assert_eq!(json["displayOptions"]["style"], "Rounded");
        let back: Track = serde_json::from_value(json).unwrap();
        assert_eq!(back, track);
    }

    #[test]
    fn test_from_file_routing() {
        assert_eq!(Track::from_file("/tmp/a.bw").track_type(), "Local BigWig");
        assert_eq!(Track::from_file("a.bigWig").track_type(), "Local BigWig");
        assert_eq!(Track::from_file("peaks.bb").track_type(), "Local BigBed");
        let bed = Track::from_file("dir/peaks.bed.gz");
        assert_eq!(bed.track_type(), "Local BED");
        assert_eq!(bed.name, "peaks.bed.gz");
        assert!(bed.is_local());
        assert!(bed.is_bed());
    }

    #[test]
    fn test_random_id() {
        let a = random_id();
        assert_eq!(a.len(), ID_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, random_id());
    }

    #[test]
    fn test_heights() {
        assert_eq!(Track::scale().height(), 30.0);
        assert_eq!(Track::ruler().height(), 20.0);
        assert_eq!(Track::bed("b", DbTrack::default()).height(), 24.0);
        assert_eq!(Track::gene("Genes").height(), 0.0);
    }
}
