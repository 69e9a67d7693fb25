//! Browser [`Settings`], the configuration value passed explicitly to the
//! binning, collapsing and layout functions.
//!
//! Every field has a default, so a partial JSON document (as persisted by a
//! host application) deserializes into a complete value:
//!
//! ```
//! use seqbrowse::prelude::*;
//!
//! let settings = Settings::from_json(r#"{"genome": "hg38", "seqs": {"smoothing": {"factor": 0.25}}}"#).unwrap();
//! assert_eq!(settings.genome, "hg38");
//! assert_eq!(settings.seqs.smoothing.factor, 0.25);
//! assert!(settings.seqs.smoothing.on);
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    bins::ScaleMode, error::SeqBrowseError, io::InputFile, layout::LayoutPolicy, Position,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub genome: String,
    pub reverse: bool,
    pub plot: PlotSettings,
    pub titles: TitleSettings,
    pub axes: AxesSettings,
    pub seqs: SeqSettings,
    pub beds: BedSettings,
    pub genes: GeneSettings,
    pub scale: ScaleBarSettings,
    pub locations: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            genome: "hg19".to_string(),
            reverse: false,
            plot: PlotSettings::default(),
            titles: TitleSettings::default(),
            axes: AxesSettings::default(),
            seqs: SeqSettings::default(),
            beds: BedSettings::default(),
            genes: GeneSettings::default(),
            scale: ScaleBarSettings::default(),
            locations: vec![
                "chr3:187441954-187466041".to_string(),
                "chr6:106441338-106557814".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SeqBrowseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a (possibly gzip-compressed) JSON file.
    pub fn from_path(filepath: impl Into<PathBuf>) -> Result<Self, SeqBrowseError> {
        let reader = InputFile::new(filepath).reader()?;
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String, SeqBrowseError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Pixel width of each location's plot.
    pub width: f64,
    /// Pixel gap between side-by-side location plots.
    pub gap: f64,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            width: 500.0,
            gap: 200.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlePosition {
    Top,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleSettings {
    pub show: bool,
    pub offset: f64,
    pub height: f64,
    pub position: TitlePosition,
}

impl Default for TitleSettings {
    fn default() -> Self {
        Self {
            show: true,
            offset: 5.0,
            height: 20.0,
            position: TitlePosition::Top,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesSettings {
    pub x: AxisHeight,
}

impl Default for AxesSettings {
    fn default() -> Self {
        Self {
            x: AxisHeight { height: 25.0 },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisHeight {
    pub height: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeqSettings {
    pub bins: BinSettings,
    pub smoothing: SmoothingSettings,
    pub scale: ReadScaleSettings,
    #[serde(rename = "globalY")]
    pub global_y: GlobalYSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BinSettings {
    /// Choose the bin size per location from its width.
    pub auto_size: bool,
    /// Fixed bin size used when `auto_size` is off.
    pub size: Position,
}

impl Default for BinSettings {
    fn default() -> Self {
        Self {
            auto_size: true,
            size: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub on: bool,
    /// Multiplier in `[0, 1]` applied to gap interpolation.
    pub factor: f64,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            on: true,
            factor: 0.5,
        }
    }
}

impl SmoothingSettings {
    /// The factor actually applied, 0 when smoothing is switched off.
    pub fn effective_factor(&self) -> f64 {
        if self.on {
            self.factor.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadScaleSettings {
    pub mode: ScaleMode,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalYSettings {
    /// Share one y-axis across all signal tracks.
    pub on: bool,
    /// Derive the shared maximum from the data.
    pub auto: bool,
    pub ymax: f64,
}

impl Default for GlobalYSettings {
    fn default() -> Self {
        Self {
            on: true,
            auto: true,
            ymax: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedSettings {
    pub height: f64,
    pub collapsed: bool,
}

impl Default for BedSettings {
    fn default() -> Self {
        Self {
            height: 16.0,
            collapsed: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneSettings {
    pub display: LayoutPolicy,
    pub canonical_only: bool,
    pub protein_coding_only: bool,
    pub labels: GeneLabelSettings,
    /// Vertical offset of the gene track below the preceding track.
    pub offset: f64,
}

impl Default for GeneSettings {
    fn default() -> Self {
        Self {
            display: LayoutPolicy::Full,
            canonical_only: false,
            protein_coding_only: true,
            labels: GeneLabelSettings::default(),
            offset: 16.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneLabelSettings {
    pub show: bool,
    pub offset: f64,
}

impl Default for GeneLabelSettings {
    fn default() -> Self {
        Self {
            show: true,
            offset: 6.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleBarSettings {
    pub auto_size: bool,
    pub bp: Position,
}

impl Default for ScaleBarSettings {
    fn default() -> Self {
        Self {
            auto_size: true,
            bp: 5000,
        }
    }
}
