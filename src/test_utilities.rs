//! Test cases and test utility functions.
//!

use rand::{seq::SliceRandom, thread_rng, Rng};
use serde_json::Value;
use std::cell::RefCell;

use crate::{
    bins::{Bin, SignalRecord},
    error::SeqBrowseError,
    features::FeatureTree,
    location::GenomicLocation,
    readers::SearchClient,
    tracks::{random_id, DbTrack, Track, TrackAction, TrackGroup, TrackGroupState},
    traits::GenericRange,
    Position,
};

// number of chromosome sequences
pub const NCHROM: usize = 22;

// location widths
pub const MIN_WIDTH: Position = 1;
pub const MAX_WIDTH: Position = 2_000_000;

pub const MAX_START: Position = 50_000_000;

// signal record lengths
pub const MAX_RECORD_LEN: Position = 50;

/// Sample a random chromosome
pub fn random_chrom() -> String {
    let mut rng = thread_rng();
    format!("chr{}", rng.gen_range(1..NCHROM + 1))
}

/// Build a random 1-based location.
pub fn random_location() -> GenomicLocation {
    let mut rng = thread_rng();
    let width = rng.gen_range(MIN_WIDTH..=MAX_WIDTH);
    let start = rng.gen_range(1..=MAX_START);
    GenomicLocation::new(&random_chrom(), start, start + width - 1)
}

/// Build `n` random signal records starting inside `location`.
pub fn random_signal_records(location: &GenomicLocation, n: usize) -> Vec<SignalRecord> {
    let mut rng = thread_rng();
    (0..n)
        .map(|_| {
            let start = rng.gen_range(location.start()..=location.end());
            let len = rng.gen_range(1..=MAX_RECORD_LEN);
            let end = (start + len - 1).min(location.end());
            SignalRecord::new(start, end, rng.gen_range(0.0..100.0))
        })
        .collect()
}

/// Build `n` contiguous bins of `width` bp from position 1, about a third
/// of them empty.
pub fn random_bins(n: usize, width: Position) -> Vec<Bin> {
    let mut rng = thread_rng();
    (0..n as Position)
        .map(|i| {
            let start = 1 + i * width;
            let value = if rng.gen_bool(0.3) {
                0.0
            } else {
                rng.gen_range(1..100) as f64
            };
            Bin::new(start, start + width, value)
        })
        .collect()
}

/// Build a tree of `n_genes` genes on chr1, each with one to three
/// transcripts. The first transcript of every gene is canonical.
pub fn random_gene_tree(n_genes: usize, max_pos: Position) -> FeatureTree {
    let mut rng = thread_rng();
    let mut tree = FeatureTree::new();
    for i in 0..n_genes {
        let len = rng.gen_range(100..=(max_pos / 10).max(101));
        let start = rng.gen_range(1..=max_pos.saturating_sub(len).max(1));
        let end = (start + len - 1).min(max_pos);
        let symbol = format!("G{}{}", i, "X".repeat(rng.gen_range(0..6)));
        let gene = tree.push_gene(GenomicLocation::new("chr1", start, end), &symbol);
        for t in 0..rng.gen_range(1..=3) {
            let t_start = rng.gen_range(start..=end);
            let t_end = rng.gen_range(t_start..=end);
            let transcript = tree.push_transcript(gene, GenomicLocation::new("chr1", t_start, t_end));
            tree.push_exon(transcript, GenomicLocation::new("chr1", t_start, t_end));
            if t == 0 {
                if let Some(node) = tree.node_mut(transcript) {
                    node.is_canonical = true;
                }
            }
        }
    }
    tree
}

/// Build a random track of one of a few types.
pub fn random_track() -> Track {
    let mut rng = thread_rng();
    let db = DbTrack {
        public_id: random_id(),
        genome: "hg19".to_string(),
        ..DbTrack::default()
    };
    match rng.gen_range(0..4) {
        0 => Track::seq("seq", db, rng.gen_range(0..10_000_000)),
        1 => Track::bed("bed", db),
        2 => Track::ruler(),
        _ => Track::gene("Genes"),
    }
}

/// Build a group of `n_tracks` random tracks.
pub fn random_group(n_tracks: usize) -> TrackGroup {
    TrackGroup::new((0..n_tracks).map(|_| random_track()).collect())
}

fn random_subset(ids: &[String]) -> Vec<String> {
    let mut rng = thread_rng();
    ids.iter().filter(|_| rng.gen_bool(0.5)).cloned().collect()
}

/// Build a random action that is valid against `state`. Orders are always
/// permutations of the current group ids.
pub fn random_track_action(state: &TrackGroupState) -> TrackAction {
    let mut rng = thread_rng();
    let group = state.order.choose(&mut rng).cloned();
    match rng.gen_range(0..9) {
        0 => TrackAction::Add {
            tracks: (0..rng.gen_range(1..3))
                .map(|_| random_group(rng.gen_range(1..4)))
                .collect(),
        },
        1 => TrackAction::Set {
            tracks: vec![random_group(2)],
        },
        2 => {
            let group = group.unwrap_or_default();
            let existing = state
                .groups
                .get(&group)
                .and_then(|g| g.order.choose(&mut rng).cloned());
            let track = match existing {
                Some(id) if rng.gen_bool(0.5) => random_track().with_id(id),
                _ => random_track(),
            };
            TrackAction::Update { group, track }
        }
        3 => {
            let mut order = state.order.clone();
            order.shuffle(&mut rng);
            TrackAction::Order { order }
        }
        4 => TrackAction::RemoveGroups {
            ids: random_subset(&state.order),
        },
        5 => {
            let group = group.unwrap_or_default();
            let ids = state
                .groups
                .get(&group)
                .map(|g| random_subset(&g.order))
                .unwrap_or_default();
            TrackAction::RemoveTracks { group, ids }
        }
        6 => TrackAction::Select {
            ids: random_subset(&state.order),
            selected: rng.gen_bool(0.5),
        },
        7 => TrackAction::Clear,
        _ => TrackAction::Reset,
    }
}

/// A [`SearchClient`] answering from canned responses. A request is
/// answered by the first response whose url fragment it contains; anything
/// else fails.
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Vec<(String, Value)>,
    requests: RefCell<Vec<(String, Value)>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url_fragment: &str, response: Value) -> Self {
        self.responses.push((url_fragment.to_string(), response));
        self
    }

    /// Every request made so far, as `(url, body)`. GET bodies are null.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }

    fn respond(&self, url: &str, body: Value) -> Result<Value, SeqBrowseError> {
        self.requests.borrow_mut().push((url.to_string(), body));
        self.responses
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| SeqBrowseError::fetch("mock", format!("no response for {}", url)))
    }
}

impl SearchClient for MockClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, SeqBrowseError> {
        self.respond(url, body.clone())
    }

    async fn get_json(&self, url: &str) -> Result<Value, SeqBrowseError> {
        self.respond(url, Value::Null)
    }
}
