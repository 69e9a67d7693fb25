//! End-to-end checks of binning, collapsing, layout and the track store.

use seqbrowse::{
    bins::make_bins,
    collapse::{collapse, collapse_spans, Span},
    layout::{layout_genes, GeneLayoutOptions},
    prelude::*,
    tracks::RenderPlan,
};

#[test]
fn test_bins_for_location() {
    let loc: GenomicLocation = "chr3:1001-2000".parse().unwrap();
    let bins = make_bins(&loc, 100).unwrap();
    assert_eq!(bins.len(), 10);
    let starts: Vec<Position> = bins.iter().map(|b| b.start).collect();
    assert_eq!(starts, (0..10).map(|i| 1001 + i * 100).collect::<Vec<_>>());
}

#[test]
fn test_collapse_merges_and_spaces() {
    let bins = vec![
        Bin::new(0, 100, 5.0),
        Bin::new(100, 200, 5.0),
        Bin::new(300, 400, 5.0),
    ];
    let spans = collapse_spans(&bins);
    assert_eq!(spans.len(), 3);
    assert_eq!((spans[0].start, spans[0].end), (0, 200));
    assert_eq!(spans[1], Span::new(200, 300, 0.0));
    assert_eq!((spans[2].start, spans[2].end, spans[2].value), (300, 400, 5.0));

    let xax = Axis::new().set_domain(0.0, 400.0).unwrap().set_length(400.0).unwrap();
    let yax = Axis::y_axis();
    let points = collapse(&bins, &xax, &yax, 0.0);
    let baseline = yax.domain_to_range(0.0);
    let (first, last) = (points.first().unwrap(), points.last().unwrap());
    assert_eq!((first.x, first.y, first.value), (0.0, baseline, 0.0));
    assert_eq!((last.x, last.y, last.value), (400.0, baseline, 0.0));
}

#[test]
fn test_pack_layout_rows() {
    let mut tree = FeatureTree::new();
    for (start, end, symbol) in [(1, 100, "A"), (50, 150, "B"), (200, 300, "C")] {
        let loc = GenomicLocation::new("chr1", start, end);
        let gene = tree.push_gene(loc.clone(), symbol);
        tree.push_transcript(gene, loc);
    }
    let xax = Axis::new().set_domain(0.0, 500.0).unwrap().set_length(500.0).unwrap();
    let layout = layout_genes(&tree, &xax, LayoutPolicy::Pack, &GeneLayoutOptions::default());
    assert_eq!(layout.row(0, 0), Some(0));
    assert_eq!(layout.row(1, 0), Some(1));
    assert_eq!(layout.row(2, 0), Some(0));
    assert_eq!(layout.num_rows(), 2);
}

#[test]
fn test_remove_last_track_keeps_group() {
    let track = Track::ruler().with_id("t1");
    let group = TrackGroup::new(vec![track]).with_id("G");
    let mut store = TrackGroupStore::default();
    store.dispatch(TrackAction::Add {
        tracks: vec![group],
    });
    store.dispatch(TrackAction::RemoveTracks {
        group: "G".to_string(),
        ids: vec!["t1".to_string()],
    });

    let g = store.groups().get("G").unwrap();
    assert!(g.order.is_empty());
    assert!(g.tracks.is_empty());
    assert_eq!(store.state().order, vec!["G".to_string()]);
    assert!(store.state().is_consistent());
}

#[test]
fn test_default_scaffold_heights() {
    let store = TrackGroupStore::new();
    let settings = Settings::default();
    let plan = RenderPlan::new(store.state());
    assert!(plan.has_gene_track());

    let heights = plan.heights(&settings, &[]);
    assert_eq!(heights.len(), store.state().order.len());
    let offsets = plan.offsets(&settings, &[]);
    assert_eq!(offsets.len(), heights.len() + 1);
    assert_eq!(offsets[0], 0.0);
    assert_eq!(*offsets.last().unwrap(), heights.iter().sum::<f64>());
}

#[test]
fn test_reset_and_clear() {
    let mut store = TrackGroupStore::default();
    assert!(store.groups().is_empty());
    store.dispatch(TrackAction::Reset);
    let types: Vec<&str> = RenderPlan::new(store.state())
        .tracks()
        .map(|t| t.track_type())
        .collect();
    assert_eq!(types, vec!["Location", "Cytobands", "Scale", "Ruler", "Gene"]);
    store.dispatch(TrackAction::Clear);
    assert!(store.groups().is_empty());
    assert!(store.state().order.is_empty());
}
