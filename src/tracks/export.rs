//! Export and import of track groups as a JSON array.
//!
//! Tracks backed by local files are left out of an export, and groups left
//! with no tracks are dropped. An imported document is meant to be
//! dispatched with [`super::TrackAction::Set`].

use serde_json::Value;
use std::path::PathBuf;

use crate::{
    error::SeqBrowseError,
    io::{InputFile, OutputFile},
};

use super::{TrackGroup, TrackGroupState};

/// The groups of `state` in display order, ready to be persisted.
pub fn exportable_groups(state: &TrackGroupState) -> Vec<TrackGroup> {
    state
        .ordered_groups()
        .filter_map(|group| {
            let mut group = group.clone();
            let local: Vec<String> = group
                .tracks
                .values()
                .filter(|t| t.is_local())
                .map(|t| t.id.clone())
                .collect();
            group.order.retain(|id| !local.contains(id));
            group.tracks.retain(|id, _| !local.contains(id));
            (!group.is_empty()).then_some(group)
        })
        .collect()
}

/// Serialize the exportable groups of `state` as pretty-printed JSON.
pub fn export_groups(state: &TrackGroupState) -> Result<String, SeqBrowseError> {
    Ok(serde_json::to_string_pretty(&exportable_groups(state))?)
}

/// Write the export to `filepath` (gzipped if it ends in `.gz`).
pub fn export_groups_to_path(
    state: &TrackGroupState,
    filepath: impl Into<PathBuf>,
) -> Result<(), SeqBrowseError> {
    let mut writer = OutputFile::new(filepath).writer()?;
    serde_json::to_writer_pretty(&mut writer, &exportable_groups(state))?;
    writer.finish()?;
    Ok(())
}

/// Parse an exported document.
pub fn import_groups(json: &str) -> Result<Vec<TrackGroup>, SeqBrowseError> {
    let value: Value = serde_json::from_str(json)?;
    groups_from_value(value)
}

/// Read an exported document from `filepath` (plain or gzip).
pub fn import_groups_from_path(
    filepath: impl Into<PathBuf>,
) -> Result<Vec<TrackGroup>, SeqBrowseError> {
    let reader = InputFile::new(filepath).reader()?;
    let value: Value = serde_json::from_reader(reader)?;
    groups_from_value(value)
}

fn groups_from_value(value: Value) -> Result<Vec<TrackGroup>, SeqBrowseError> {
    if !value.is_array() {
        return Err(SeqBrowseError::ParseError(
            "track groups must be a JSON array".to_string(),
        ));
    }
    let groups: Vec<TrackGroup> = serde_json::from_value(value)?;
    if let Some(bad) = groups.iter().find(|g| !g.is_consistent()) {
        return Err(SeqBrowseError::ParseError(format!(
            "order of track group '{}' does not match its tracks",
            bad.id
        )));
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{Track, TrackAction, TrackGroupStore};

    fn store_with_local() -> TrackGroupStore {
        let mut store = TrackGroupStore::new();
        let local = TrackGroup::new(vec![Track::from_file("peaks.bed")]).with_id("local");
        let mixed = TrackGroup::new(vec![
            Track::seq("Input", Default::default(), 100).with_id("s1"),
            Track::from_file("signal.bw").with_id("s2"),
        ])
        .with_id("mixed");
        store.dispatch(TrackAction::Add {
            tracks: vec![local, mixed],
        });
        store
    }

    #[test]
    fn test_export_drops_local_tracks() {
        let store = store_with_local();
        let groups = exportable_groups(store.state());
        assert_eq!(groups.len(), 6);
        assert!(groups.iter().all(|g| g.id != "local"));
        let mixed = groups.iter().find(|g| g.id == "mixed").unwrap();
        assert_eq!(mixed.order, vec!["s1"]);
        assert!(mixed.is_consistent());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let store = store_with_local();
        let json = export_groups(store.state()).unwrap();
        let groups = import_groups(&json).unwrap();
        assert_eq!(groups, exportable_groups(store.state()));

        let mut restored = TrackGroupStore::default();
        let state = restored.dispatch(TrackAction::Set { tracks: groups });
        assert_eq!(state.order.len(), 6);
    }

    #[test]
    fn test_import_malformed() {
        assert!(matches!(
            import_groups(r#"{"id": "g"}"#),
            Err(SeqBrowseError::ParseError(_))
        ));
        assert!(matches!(
            import_groups("[{"),
            Err(SeqBrowseError::JsonError(_))
        ));
        let inconsistent = r#"[{"id": "g", "name": "G", "order": ["x"], "tracks": {}}]"#;
        assert!(matches!(
            import_groups(inconsistent),
            Err(SeqBrowseError::ParseError(_))
        ));
    }

    #[test]
    fn test_export_to_path() {
        let store = TrackGroupStore::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json.gz");
        export_groups_to_path(store.state(), &path).unwrap();
        let groups = import_groups_from_path(&path).unwrap();
        assert_eq!(groups.len(), 5);
    }
}
