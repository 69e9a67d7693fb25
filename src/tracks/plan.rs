//! The ordered render plan for a [`TrackGroupState`] snapshot: which tracks
//! need data, and how much vertical space each group takes.

use crate::{
    axis::Axis,
    config::{Settings, TitlePosition},
    features::FeatureTree,
    layout::{bed_track_height, layout_genes, GeneLayout, GeneLayoutOptions, CHAR_WIDTH},
};

use super::{GeneDisplayOptions, Track, TrackGroupState, TrackKind};

impl From<&GeneDisplayOptions> for GeneLayoutOptions {
    fn from(options: &GeneDisplayOptions) -> Self {
        GeneLayoutOptions {
            transcript_height: options.transcripts.height,
            gap: options.genes.gap,
            char_width: CHAR_WIDTH,
        }
    }
}

/// The tracks of each group, in display order.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan<'a> {
    pub groups: Vec<Vec<&'a Track>>,
}

impl<'a> RenderPlan<'a> {
    pub fn new(state: &'a TrackGroupState) -> Self {
        let groups = state
            .ordered_groups()
            .map(|g| g.ordered_tracks().collect())
            .collect();
        Self { groups }
    }

    /// Every track, flattened in display order.
    pub fn tracks(&self) -> impl Iterator<Item = &'a Track> + '_ {
        self.groups.iter().flatten().copied()
    }

    /// Tracks that need binned signal data.
    pub fn signal_tracks(&self) -> Vec<&'a Track> {
        self.tracks().filter(|t| t.is_signal()).collect()
    }

    /// Signal tracks served by the bins endpoint.
    pub fn seq_tracks(&self) -> Vec<&'a Track> {
        self.tracks()
            .filter(|t| matches!(t.kind, TrackKind::Seq(_)))
            .collect()
    }

    /// Tracks that need BED-like feature data.
    pub fn bed_tracks(&self) -> Vec<&'a Track> {
        self.tracks().filter(|t| t.is_bed()).collect()
    }

    pub fn has_gene_track(&self) -> bool {
        self.tracks().any(|t| matches!(t.kind, TrackKind::Gene(_)))
    }

    /// Height of each group. A group is sized by its first track's type.
    /// `genes` holds the gene features and x-axis of each displayed location;
    /// a gene group takes the tallest layout among them.
    pub fn heights(&self, settings: &Settings, genes: &[(FeatureTree, Axis)]) -> Vec<f64> {
        self.groups
            .iter()
            .map(|tracks| group_height(tracks, settings, genes))
            .collect()
    }

    /// The vertical offset of each group, followed by the total height.
    pub fn offsets(&self, settings: &Settings, genes: &[(FeatureTree, Axis)]) -> Vec<f64> {
        let mut y = 0.0;
        let mut offsets = vec![0.0];
        for height in self.heights(settings, genes) {
            y += height;
            offsets.push(y);
        }
        offsets
    }

    /// Gene layouts for each location, using the first gene track's options.
    pub fn gene_layouts(&self, settings: &Settings, genes: &[(FeatureTree, Axis)]) -> Vec<GeneLayout> {
        let options = self.tracks().find_map(|t| match &t.kind {
            TrackKind::Gene(g) => Some(GeneLayoutOptions::from(&g.display_options)),
            _ => None,
        });
        match options {
            Some(options) => genes
                .iter()
                .map(|(tree, xax)| layout_genes(tree, xax, settings.genes.display, &options))
                .collect(),
            None => Vec::new(),
        }
    }
}

fn group_height(tracks: &[&Track], settings: &Settings, genes: &[(FeatureTree, Axis)]) -> f64 {
    let first = match tracks.first() {
        Some(first) => first,
        None => return 0.0,
    };
    let titles = &settings.titles;
    let title_top = if titles.position == TitlePosition::Top {
        titles.height
    } else {
        0.0
    };

    match &first.kind {
        TrackKind::Seq(_) | TrackKind::LocalBigWig(_) | TrackKind::RemoteBigWig(_) => {
            let right = if titles.position == TitlePosition::Right {
                titles.height
            } else {
                0.0
            };
            first.height() + title_top + titles.height + settings.axes.x.height + right
        }
        TrackKind::Scale(_) | TrackKind::Location(_) => first.height(),
        TrackKind::Ruler(_) | TrackKind::Cytobands(_) => first.height() + titles.height,
        TrackKind::Gene(g) => {
            let options = GeneLayoutOptions::from(&g.display_options);
            let tallest = genes
                .iter()
                .map(|(tree, xax)| layout_genes(tree, xax, settings.genes.display, &options).height)
                .fold(0.0, f64::max);
            tallest + title_top + settings.genes.offset
        }
        TrackKind::Bed(_)
        | TrackKind::LocalBed(_)
        | TrackKind::RemoteBigBed(_)
        | TrackKind::LocalBigBed(_) => {
            bed_track_height(tracks.iter().map(|t| t.height()), settings.beds.collapsed) + title_top
        }
    }
}
