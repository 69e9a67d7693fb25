//! [`TrackGroup`]s, a set of tracks drawn overlaid as one unit, and the
//! store's [`TrackGroupState`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{random_id, Track, TRACK_GROUP_TYPE};

fn group_track_type() -> String {
    TRACK_GROUP_TYPE.to_string()
}

/// An ordered set of tracks. `order` always holds exactly the keys of
/// `tracks`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackGroup {
    pub id: String,
    #[serde(default = "group_track_type")]
    pub track_type: String,
    pub name: String,
    pub order: Vec<String>,
    pub tracks: IndexMap<String, Track>,
}

impl TrackGroup {
    /// Group `tracks` under a new id, taking the name of the first track.
    /// A repeated track id keeps its first position and the later track.
    pub fn new(tracks: Vec<Track>) -> Self {
        let name = tracks.first().map(|t| t.name.clone()).unwrap_or_default();
        let tracks: IndexMap<String, Track> =
            tracks.into_iter().map(|t| (t.id.clone(), t)).collect();
        let order = tracks.keys().cloned().collect();
        Self {
            id: random_id(),
            track_type: group_track_type(),
            name,
            order,
            tracks,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Tracks in display order.
    pub fn ordered_tracks(&self) -> impl Iterator<Item = &Track> + '_ {
        self.order.iter().filter_map(move |id| self.tracks.get(id))
    }

    /// The first track in display order, which sets the group's drawing type.
    pub fn first(&self) -> Option<&Track> {
        self.ordered_tracks().next()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether `order` is a permutation of the track ids.
    pub fn is_consistent(&self) -> bool {
        is_permutation(&self.order, self.tracks.keys())
    }
}

/// The state held by a [`super::TrackGroupStore`]. `order` always holds
/// exactly the keys of `groups`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackGroupState {
    pub order: Vec<String>,
    pub groups: IndexMap<String, TrackGroup>,
    pub selected: IndexMap<String, bool>,
}

impl TrackGroupState {
    /// Groups in display order.
    pub fn ordered_groups(&self) -> impl Iterator<Item = &TrackGroup> + '_ {
        self.order.iter().filter_map(move |id| self.groups.get(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.get(id).copied().unwrap_or(false)
    }

    /// Whether the top-level order and every group's order are permutations
    /// of their key sets.
    pub fn is_consistent(&self) -> bool {
        is_permutation(&self.order, self.groups.keys())
            && self.groups.values().all(|g| g.is_consistent())
    }
}

fn is_permutation<'a, I>(order: &[String], keys: I) -> bool
where
    I: ExactSizeIterator<Item = &'a String>,
{
    if order.len() != keys.len() {
        return false;
    }
    let mut sorted: Vec<&String> = order.iter().collect();
    let mut expected: Vec<&String> = keys.collect();
    sorted.sort();
    expected.sort();
    sorted == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group() {
        let a = Track::scale().with_id("a");
        let b = Track::ruler().with_id("b");
        let group = TrackGroup::new(vec![a, b]);
        assert_eq!(group.name, "Scale");
        assert_eq!(group.order, vec!["a", "b"]);
        assert_eq!(group.track_type, TRACK_GROUP_TYPE);
        assert!(group.is_consistent());
        assert_eq!(group.first().map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn test_new_group_repeated_ids() {
        let a = Track::scale().with_id("a");
        let b = Track::ruler().with_id("b");
        let again = Track::ruler().with_id("a");
        let group = TrackGroup::new(vec![a, b, again]);
        assert_eq!(group.order, vec!["a", "b"]);
        assert_eq!(group.len(), 2);
        assert!(group.is_consistent());
        assert_eq!(group.first().map(|t| t.track_type()), Some("Ruler"));
        assert_eq!(group.name, "Scale");
    }

    #[test]
    fn test_consistency() {
        let mut group = TrackGroup::new(vec![Track::scale().with_id("a")]);
        group.order.push("a".to_string());
        assert!(!group.is_consistent());
        group.order = vec!["z".to_string()];
        assert!(!group.is_consistent());
    }
}
