//! The track group reducer and the [`TrackGroupStore`] that serializes
//! mutations through it.
//!
//! [`track_reducer`] is pure: it takes the current state by reference and
//! returns the next one. Every transition keeps each group's `order` equal
//! to its track ids and the top-level `order` equal to the group ids, except
//! [`TrackAction::Order`], whose permutation is the caller's responsibility.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Track, TrackGroup, TrackGroupState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TrackAction {
    /// Append groups. A group whose id is already present is replaced in place.
    Add { tracks: Vec<TrackGroup> },
    /// Replace all groups and clear the selection.
    Set { tracks: Vec<TrackGroup> },
    /// Insert or replace `track` in the group with id `group`.
    Update { group: String, track: Track },
    /// Replace the top-level order.
    Order { order: Vec<String> },
    RemoveGroups { ids: Vec<String> },
    /// Remove tracks from one group. The group is kept even if left empty.
    RemoveTracks { group: String, ids: Vec<String> },
    Select { ids: Vec<String>, selected: bool },
    Clear,
    /// Replace everything with the default utility tracks, one per group.
    Reset,
}

impl TrackAction {
    pub fn name(&self) -> &'static str {
        match self {
            TrackAction::Add { .. } => "add",
            TrackAction::Set { .. } => "set",
            TrackAction::Update { .. } => "update",
            TrackAction::Order { .. } => "order",
            TrackAction::RemoveGroups { .. } => "remove-groups",
            TrackAction::RemoveTracks { .. } => "remove-tracks",
            TrackAction::Select { .. } => "select",
            TrackAction::Clear => "clear",
            TrackAction::Reset => "reset",
        }
    }
}

fn groups_state(groups: Vec<TrackGroup>) -> TrackGroupState {
    let mut state = TrackGroupState::default();
    insert_groups(&mut state, groups);
    state
}

fn insert_groups(state: &mut TrackGroupState, groups: Vec<TrackGroup>) {
    for group in groups {
        if !group.is_consistent() {
            log::warn!("skipping group '{}': order does not match its tracks", group.id);
            continue;
        }
        if state.groups.insert(group.id.clone(), group.clone()).is_none() {
            state.order.push(group.id);
        }
    }
}

/// The default scaffold: location, cytobands, scale, ruler and genes.
pub fn default_groups() -> Vec<TrackGroup> {
    [
        Track::location(),
        Track::cytobands(),
        Track::scale(),
        Track::ruler(),
        Track::gene("Genes"),
    ]
    .into_iter()
    .map(|track| TrackGroup::new(vec![track]))
    .collect()
}

/// Compute the state following `action`.
pub fn track_reducer(state: &TrackGroupState, action: TrackAction) -> TrackGroupState {
    match action {
        TrackAction::Add { tracks } => {
            let mut next = state.clone();
            insert_groups(&mut next, tracks);
            next
        }
        TrackAction::Set { tracks } => groups_state(tracks),
        TrackAction::Update { group, track } => {
            let mut next = state.clone();
            if let Some(g) = next.groups.get_mut(&group) {
                if g.tracks.insert(track.id.clone(), track.clone()).is_none() {
                    g.order.push(track.id);
                }
            }
            next
        }
        TrackAction::Order { order } => TrackGroupState {
            order,
            ..state.clone()
        },
        TrackAction::RemoveGroups { ids } => {
            let mut next = state.clone();
            next.order.retain(|id| !ids.contains(id));
            next.groups.retain(|id, _| !ids.contains(id));
            next
        }
        TrackAction::RemoveTracks { group, ids } => {
            let mut next = state.clone();
            if let Some(g) = next.groups.get_mut(&group) {
                g.order.retain(|id| !ids.contains(id));
                g.tracks.retain(|id, _| !ids.contains(id));
            }
            next
        }
        TrackAction::Select { ids, selected } => {
            let mut next = state.clone();
            for id in ids {
                next.selected.insert(id, selected);
            }
            next
        }
        TrackAction::Clear => TrackGroupState::default(),
        TrackAction::Reset => groups_state(default_groups()),
    }
}

/// Holds the current [`TrackGroupState`] snapshot and applies actions to it
/// one at a time.
#[derive(Clone, Debug, Default)]
pub struct TrackGroupStore {
    state: TrackGroupState,
}

impl TrackGroupStore {
    /// A store holding the default scaffold.
    pub fn new() -> Self {
        Self {
            state: groups_state(default_groups()),
        }
    }

    pub fn from_state(state: TrackGroupState) -> Self {
        Self { state }
    }

    pub fn dispatch(&mut self, action: TrackAction) -> &TrackGroupState {
        log::debug!("track store: {}", action.name());
        self.state = track_reducer(&self.state, action);
        &self.state
    }

    pub fn state(&self) -> &TrackGroupState {
        &self.state
    }

    pub fn groups(&self) -> &IndexMap<String, TrackGroup> {
        &self.state.groups
    }
}
