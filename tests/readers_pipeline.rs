//! Readers built from tracks, concurrent fetches and stale-result handling.

use futures::executor::block_on;
use serde_json::json;
use std::io::Write;

use seqbrowse::{
    prelude::*,
    readers::{fetch_features, fetch_signals, Endpoints, LocalFiles},
    test_utilities::MockClient,
    tracks::{export_groups, import_groups, DbTrack},
};

fn db(public_id: &str) -> DbTrack {
    DbTrack {
        public_id: public_id.to_string(),
        genome: "hg19".to_string(),
        ..DbTrack::default()
    }
}

fn bed_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
    writeln!(file, "chr1\t99\t200\tpeak1\t10\t-").unwrap();
    writeln!(file, "chr1\t5000\t6000\tpeak2\t.\t+").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_local_bed_track_reader() {
    let file = bed_file();
    let track = Track::from_file(file.path());
    assert_eq!(track.track_type(), "Local BED");
    assert!(track.is_local());

    let client = MockClient::new();
    let endpoints = Endpoints::new("http://api");
    let mut reader = Reader::for_track(&track, "hg19", &client, &endpoints, &LocalFiles).unwrap();
    assert!(matches!(reader, Reader::LocalIndexed(_)));

    let features = block_on(reader.features(&GenomicLocation::new("chr1", 1, 1000))).unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].name, "peak1");
    assert_eq!((features[0].start(), features[0].end()), (100, 200));
    assert_eq!(features[0].location.strand(), Strand::Reverse);
    assert_eq!(features[0].score, Some(10.0));

    // no request leaves the process for a local file
    assert!(client.requests().is_empty());
}

#[test]
fn test_failing_track_renders_empty() {
    let client = MockClient::new().with_response(
        "/modules/seqs/bins",
        json!({"data": [{
            "location": {"chr": "chr1", "start": 1, "end": 400},
            "tracks": [{"publicId": "ok", "binSize": 200, "bins": [[1, 200, 3], [201, 400, 6]]}]
        }]}),
    );
    let endpoints = Endpoints::new("http://api");
    let tracks = vec![
        Track::seq("good", db("ok"), 1_000_000),
        Track::bed("broken", db("b1")),
        Track::ruler(),
    ];
    let mut readers: Vec<_> = tracks
        .iter()
        .map(|t| Reader::for_track(t, "hg19", &client, &endpoints, &LocalFiles).unwrap())
        .collect();

    let loc = GenomicLocation::new("chr1", 1, 400);
    let signals = block_on(fetch_signals(&mut readers, &loc, 200, ScaleMode::Count));
    assert_eq!(signals.len(), 3);
    assert_eq!(signals[0].len(), 2);
    assert_eq!(signals[0][1].value, 6.0);
    assert!(signals[2].is_empty());

    // the regions endpoint has no response, so the BED track fails alone
    let features = block_on(fetch_features(&mut readers, &loc));
    assert_eq!(features.len(), 3);
    assert!(features.iter().all(|f| f.is_empty()));
    assert!(client
        .requests()
        .iter()
        .any(|(url, _)| url.ends_with("/modules/beds/regions")));
}

#[test]
fn test_missing_local_file() {
    let track = Track::from_file("/no/such/dir/signal.bw");
    assert_eq!(track.track_type(), "Local BigWig");
    let client = MockClient::new();
    let result = Reader::for_track(&track, "hg19", &client, &Endpoints::new("http://api"), &LocalFiles);
    assert!(matches!(result, Err(SeqBrowseError::IOError(_))));
}

#[test]
fn test_stale_fetch_is_discarded() {
    let settings = Settings::default();
    let mut view = ViewState::new(vec![GenomicLocation::new("chr1", 1, 400)], &settings);
    let client = MockClient::new().with_response(
        "/modules/seqs/bins",
        json!([{
            "location": {"chr": "chr1", "start": 1, "end": 400},
            "tracks": [{"publicId": "ok", "binSize": 200, "bins": [[1, 200, 3]]}]
        }]),
    );
    let track = Track::seq("good", db("ok"), 0);
    let mut readers =
        vec![Reader::for_track(&track, "hg19", &client, &Endpoints::new("http://api"), &LocalFiles).unwrap()];

    let ticket = view.ticket();
    let result = block_on(fetch_signals(
        &mut readers,
        &ticket.locations[0],
        ticket.bin_sizes[0],
        ScaleMode::Count,
    ));
    view.pan(1000, &settings);
    assert!(view.apply(&ticket, result.clone()).is_none());

    let ticket = view.ticket();
    assert_eq!(view.apply(&ticket, result).map(|r| r.len()), Some(1));
}

#[test]
fn test_export_skips_local_tracks() {
    let file = bed_file();
    let mut store = TrackGroupStore::new();
    store.dispatch(TrackAction::Add {
        tracks: vec![
            TrackGroup::new(vec![Track::seq("H3K4me3", db("s1"), 5_000_000)]).with_id("seqs"),
            TrackGroup::new(vec![Track::from_file(file.path())]).with_id("local"),
        ],
    });

    let json = export_groups(store.state()).unwrap();
    let groups = import_groups(&json).unwrap();
    assert!(groups.iter().all(|g| g.id != "local"));
    let seqs = groups.iter().find(|g| g.id == "seqs").unwrap();
    assert_eq!(seqs.first().and_then(|t| t.public_id()), Some("s1"));

    let mut restored = TrackGroupStore::default();
    restored.dispatch(TrackAction::Set { tracks: groups });
    assert!(restored.state().is_consistent());
    assert_eq!(restored.groups().len(), store.groups().len() - 1);
}

#[test]
fn test_cytobands_track_reader() {
    let client = MockClient::new().with_response(
        "/modules/cytobands",
        json!({"data": [
            {"loc": {"chr": "chr1", "start": 1, "end": 2300000}, "name": "p36.33", "giemsaStain": "gneg"},
            {"loc": {"chr": "chr1", "start": 2300001, "end": 5300000}, "name": "p36.32", "giemsaStain": "gpos25"}
        ]}),
    );
    let track = Track::cytobands();
    let mut reader =
        Reader::for_track(&track, "hg38", &client, &Endpoints::new("http://api"), &LocalFiles).unwrap();
    assert!(matches!(reader, Reader::Cytobands(_)));

    let bands = block_on(reader.features(&GenomicLocation::new("chr1", 1_000_000, 1_500_000))).unwrap();
    assert_eq!(bands.len(), 1);
    assert_eq!(bands[0].name, "p36.33");
    assert_eq!(client.requests()[0].0, "http://api/modules/cytobands/hg38/chr1");
}
