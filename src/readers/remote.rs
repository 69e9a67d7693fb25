//! Batched queries against the backend's JSON search endpoints.
//!
//! The HTTP transport is the host's: it implements [`SearchClient`], and
//! this module builds request bodies and parses responses. Responses may be
//! bare or wrapped in a `{"data": ...}` envelope.

use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::{
    bins::{bins_from_counts, Bin, ScaleFactors, ScaleMode},
    error::SeqBrowseError,
    features::{BedFeature, Cytoband, FeatureTree, GenomicFeature},
    location::GenomicLocation,
    tracks::{random_id, Track},
    Position,
};

use super::TrackReader;

/// The JSON transport to the backend.
pub trait SearchClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, SeqBrowseError>;

    async fn get_json(&self, url: &str) -> Result<Value, SeqBrowseError>;
}

impl<T: SearchClient + ?Sized> SearchClient for &T {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, SeqBrowseError> {
        (**self).post_json(url, body).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, SeqBrowseError> {
        (**self).get_json(url).await
    }
}

/// Backend endpoint urls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub seqs_bins: String,
    pub seqs_search: String,
    pub beds_regions: String,
    pub beds_search: String,
    pub genome_overlap: String,
    pub genome_info: String,
    pub cytobands: String,
}

impl Endpoints {
    /// The standard endpoint layout under `base`.
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            seqs_bins: format!("{base}/modules/seqs/bins"),
            seqs_search: format!("{base}/modules/seqs/search"),
            beds_regions: format!("{base}/modules/beds/regions"),
            beds_search: format!("{base}/modules/beds/search"),
            genome_overlap: format!("{base}/modules/genome/overlap"),
            genome_info: format!("{base}/modules/genome/info"),
            cytobands: format!("{base}/modules/cytobands"),
        }
    }
}

/// Binned counts for one track at one location.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBinCounts {
    #[serde(default)]
    pub name: String,
    pub public_id: String,
    pub bin_size: Position,
    /// `[start, end, count]` with a 1-based start and inclusive end.
    pub bins: Vec<(Position, Position, f64)>,
    #[serde(default)]
    pub ymax: f64,
    #[serde(default)]
    pub bpm_scale_factor: f64,
}

impl TrackBinCounts {
    /// Convert to bins, scaling by `mode`. `total_reads` is the track's read
    /// count, used by CPM.
    pub fn to_bins(&self, mode: ScaleMode, total_reads: u64) -> Vec<Bin> {
        let factors = ScaleFactors {
            total_reads,
            bpm_scale_factor: self.bpm_scale_factor,
        };
        bins_from_counts(&self.bins, mode, &factors)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LocationBins {
    pub location: GenomicLocation,
    pub tracks: Vec<TrackBinCounts>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LocationFeatures {
    pub location: GenomicLocation,
    #[serde(default)]
    pub features: Vec<GenomicFeature>,
}

fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn parse_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SeqBrowseError> {
    Ok(serde_json::from_value(unwrap_data(value))?)
}

/// `base` extended by percent-encoded path `segments` and a query string.
fn endpoint_url(
    base: &str,
    segments: &[&str],
    query: &[(&str, &str)],
) -> Result<String, SeqBrowseError> {
    let bad = |e: String| SeqBrowseError::ParseError(format!("endpoint '{}': {}", base, e));
    let mut url = Url::parse(base).map_err(|e| bad(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| bad("cannot be a base url".to_string()))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url.into())
}

fn location_strings(locations: &[GenomicLocation]) -> Vec<String> {
    locations.iter().map(|l| l.to_string()).collect()
}

/// Bins for several tracks at several locations in one request.
pub async fn signal_batch<C: SearchClient>(
    client: &C,
    endpoints: &Endpoints,
    locations: &[GenomicLocation],
    bin_sizes: &[Position],
    public_ids: &[&str],
) -> Result<Vec<LocationBins>, SeqBrowseError> {
    let body = json!({
        "locations": location_strings(locations),
        "binSizes": bin_sizes,
        "tracks": public_ids,
    });
    log::debug!("bins query for {} tracks at {:?}", public_ids.len(), body["locations"]);
    parse_response(client.post_json(&endpoints.seqs_bins, &body).await?)
}

/// BED regions for several tracks at one location, one list per track.
pub async fn features_batch<C: SearchClient>(
    client: &C,
    endpoints: &Endpoints,
    location: &GenomicLocation,
    public_ids: &[&str],
) -> Result<Vec<Vec<BedFeature>>, SeqBrowseError> {
    let body = json!({
        "location": location.to_string(),
        "beds": public_ids,
    });
    log::debug!("bed regions query for {} tracks at {}", public_ids.len(), location);
    parse_response(client.post_json(&endpoints.beds_regions, &body).await?)
}

/// Gene models overlapping each location, as one [`FeatureTree`] per
/// location in request order.
pub async fn genes<C: SearchClient>(
    client: &C,
    endpoints: &Endpoints,
    genome: &str,
    locations: &[GenomicLocation],
    canonical_only: bool,
    protein_coding_only: bool,
) -> Result<Vec<FeatureTree>, SeqBrowseError> {
    let canonical = canonical_only.to_string();
    let mut query = vec![("canonical", canonical.as_str())];
    if protein_coding_only {
        query.push(("type", "protein_coding"));
    }
    let url = endpoint_url(&endpoints.genome_overlap, &[genome], &query)?;
    let body = json!({ "locations": location_strings(locations) });
    log::debug!("genes query {}", url);
    let found: Vec<LocationFeatures> = parse_response(client.post_json(&url, &body).await?)?;
    Ok(found
        .iter()
        .map(|lf| {
            let tree = FeatureTree::from_features(&lf.features);
            if canonical_only {
                tree.canonical_only()
            } else {
                tree
            }
        })
        .collect())
}

/// Resolve a gene symbol to the location of the best match.
pub async fn search_gene<C: SearchClient>(
    client: &C,
    endpoints: &Endpoints,
    genome: &str,
    symbol: &str,
) -> Result<Option<GenomicLocation>, SeqBrowseError> {
    let url = endpoint_url(
        &endpoints.genome_info,
        &[genome],
        &[("search", symbol), ("level", "gene"), ("mode", "fuzzy")],
    )?;
    let found: Vec<GenomicFeature> = parse_response(client.get_json(&url).await?)?;
    Ok(found.into_iter().next().map(|f| f.location))
}

/// Every band of chromosome `chr`, in chromosome order.
pub async fn cytobands<C: SearchClient>(
    client: &C,
    endpoints: &Endpoints,
    genome: &str,
    chr: &str,
) -> Result<Vec<Cytoband>, SeqBrowseError> {
    let url = endpoint_url(&endpoints.cytobands, &[genome, chr], &[])?;
    log::debug!("cytobands query {}", url);
    parse_response(client.get_json(&url).await?)
}

/// The track database for `genome`. Entries without an id get a new one.
pub async fn search_tracks<C: SearchClient>(
    client: &C,
    endpoints: &Endpoints,
    genome: &str,
) -> Result<Vec<Track>, SeqBrowseError> {
    let url = endpoint_url(&endpoints.seqs_search, &[genome], &[])?;
    let entries: Vec<Value> = parse_response(client.get_json(&url).await?)?;
    entries
        .into_iter()
        .map(|mut entry| {
            if let Value::Object(map) = &mut entry {
                map.entry("id").or_insert_with(|| Value::String(random_id()));
                map.entry("name").or_insert_with(|| Value::String(String::new()));
            }
            Ok(serde_json::from_value(entry)?)
        })
        .collect()
}

/// A reader for one database track served by the backend.
#[derive(Clone, Debug)]
pub struct RemoteTabularReader<C> {
    name: String,
    public_id: String,
    total_reads: u64,
    client: C,
    endpoints: Endpoints,
}

impl<C: SearchClient> RemoteTabularReader<C> {
    pub fn new(
        name: impl Into<String>,
        public_id: &str,
        total_reads: u64,
        client: C,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            name: name.into(),
            public_id: public_id.to_string(),
            total_reads,
            client,
            endpoints,
        }
    }

    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    fn fetch_error(&self, e: impl std::fmt::Display) -> SeqBrowseError {
        SeqBrowseError::fetch(self.name.clone(), e)
    }
}

impl<C: SearchClient> TrackReader for RemoteTabularReader<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn signal(
        &mut self,
        location: &GenomicLocation,
        bin_size: Position,
        mode: ScaleMode,
    ) -> Result<Vec<Bin>, SeqBrowseError> {
        let found = signal_batch(
            &self.client,
            &self.endpoints,
            std::slice::from_ref(location),
            &[bin_size],
            &[self.public_id.as_str()],
        )
        .await
        .map_err(|e| self.fetch_error(e))?;

        Ok(found
            .iter()
            .flat_map(|lb| lb.tracks.iter())
            .find(|t| t.public_id == self.public_id)
            .map(|t| t.to_bins(mode, self.total_reads))
            .unwrap_or_default())
    }

    async fn features(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        let found = features_batch(
            &self.client,
            &self.endpoints,
            location,
            &[self.public_id.as_str()],
        )
        .await
        .map_err(|e| self.fetch_error(e))?;
        Ok(found.into_iter().next().unwrap_or_default())
    }
}

/// The bands of the chromosome on display. Bands are fetched once per
/// chromosome and kept until the view moves to another one.
#[derive(Clone, Debug)]
pub struct CytobandReader<C> {
    name: String,
    genome: String,
    client: C,
    endpoints: Endpoints,
    cache: Option<(String, Vec<Cytoband>)>,
}

impl<C: SearchClient> CytobandReader<C> {
    pub fn new(name: impl Into<String>, genome: &str, client: C, endpoints: Endpoints) -> Self {
        Self {
            name: name.into(),
            genome: genome.to_string(),
            client,
            endpoints,
            cache: None,
        }
    }

    /// All bands of `chr`.
    pub async fn chromosome(&mut self, chr: &str) -> Result<Vec<Cytoband>, SeqBrowseError> {
        if let Some((cached, bands)) = &self.cache {
            if cached == chr {
                log::debug!("'{}': cached cytobands for {}", self.name, chr);
                return Ok(bands.clone());
            }
        }
        let bands = cytobands(&self.client, &self.endpoints, &self.genome, chr)
            .await
            .map_err(|e| SeqBrowseError::fetch(self.name.clone(), e))?;
        self.cache = Some((chr.to_string(), bands.clone()));
        Ok(bands)
    }

    /// The bands of `location`'s chromosome overlapping it.
    pub async fn overlapping(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<Cytoband>, SeqBrowseError> {
        let bands = self.chromosome(location.chr()).await?;
        Ok(bands
            .into_iter()
            .filter(|band| band.location.overlaps(location))
            .collect())
    }
}

impl<C: SearchClient> TrackReader for CytobandReader<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn signal(
        &mut self,
        _location: &GenomicLocation,
        _bin_size: Position,
        _mode: ScaleMode,
    ) -> Result<Vec<Bin>, SeqBrowseError> {
        Ok(Vec::new())
    }

    /// Overlapping bands as features tagged with their stain.
    async fn features(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        let bands = self.overlapping(location).await?;
        Ok(bands.into_iter().map(BedFeature::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::test_utilities::MockClient;
    use futures::executor::block_on;

    fn bins_response() -> Value {
        json!({"data": [{
            "location": {"chr": "chr1", "start": 1, "end": 300},
            "tracks": [
                {"publicId": "other", "binSize": 100, "bins": [], "ymax": 0},
                {"publicId": "p1", "binSize": 100, "bins": [[1, 100, 4], [101, 200, 8]],
                 "ymax": 8, "bpmScaleFactor": 0.5}
            ]
        }]})
    }

    #[test]
    fn test_remote_signal() {
        let client = MockClient::new().with_response("/modules/seqs/bins", bins_response());
        let mut reader =
            RemoteTabularReader::new("H3K27ac", "p1", 2_000_000, &client, Endpoints::new("http://api"));
        let loc = GenomicLocation::new("chr1", 1, 300);

        let bins = block_on(reader.signal(&loc, 100, ScaleMode::Count)).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].start, bins[0].end, bins[0].value), (1, 101, 4.0));
        assert_eq!(bins[1].start, bins[0].end);

        let bins = block_on(reader.signal(&loc, 100, ScaleMode::Bpm)).unwrap();
        assert_eq!(bins[1].value, 4.0);

        let bins = block_on(reader.signal(&loc, 100, ScaleMode::Cpm)).unwrap();
        assert_eq!(bins[0].value, 2.0);

        let request = &client.requests()[0];
        assert_eq!(request.0, "http://api/modules/seqs/bins");
        assert_eq!(request.1["locations"][0], "chr1:1-300");
        assert_eq!(request.1["tracks"][0], "p1");
    }

    #[test]
    fn test_remote_failure_is_scoped_to_track() {
        let client = MockClient::new();
        let mut reader =
            RemoteTabularReader::new("broken", "p1", 0, &client, Endpoints::new("http://api"));
        let result = block_on(reader.features(&GenomicLocation::new("chr1", 1, 10)));
        match result {
            Err(SeqBrowseError::DataFetch { track, .. }) => assert_eq!(track, "broken"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_genes_query() {
        let response = json!([{
            "location": {"chr": "chr3", "start": 1, "end": 1000},
            "features": [{
                "loc": {"chr": "chr3", "start": 10, "end": 500}, "level": "gene", "geneSymbol": "BCL6",
                "children": [
                    {"loc": {"chr": "chr3", "start": 10, "end": 500}, "level": "transcript", "isCanonical": true},
                    {"loc": {"chr": "chr3", "start": 20, "end": 400}, "level": "transcript"}
                ]
            }]
        }]);
        let client = MockClient::new().with_response("/modules/genome/overlap", response);
        let endpoints = Endpoints::new("http://api/");
        let locations = vec![GenomicLocation::new("chr3", 1, 1000)];

        let trees = block_on(genes(&client, &endpoints, "hg19", &locations, true, true)).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].num_transcripts(), 1);
        let url = &client.requests()[0].0;
        assert_eq!(
            url,
            "http://api/modules/genome/overlap/hg19?canonical=true&type=protein_coding"
        );
    }

    #[test]
    fn test_search_tracks_assigns_ids() {
        let response = json!([
            {"trackType": "Seq", "name": "Input", "publicId": "s1", "reads": 10},
            {"trackType": "Remote BigWig", "name": "Signal", "publicId": "s2", "url": "http://x/y.bw"}
        ]);
        let client = MockClient::new().with_response("/modules/seqs/search", response);
        let tracks =
            block_on(search_tracks(&client, &Endpoints::new("http://api"), "hg19")).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].public_id(), Some("s1"));
        assert_eq!(tracks[1].track_type(), "Remote BigWig");
        assert_eq!(tracks[0].id.len(), crate::tracks::ID_LENGTH);
    }

    fn cytobands_response() -> Value {
        json!({"data": [
            {"loc": {"chr": "chr3", "start": 1, "end": 2800000}, "name": "p26.3", "giemsaStain": "gneg"},
            {"loc": {"chr": "chr3", "start": 2800001, "end": 4000000}, "name": "p26.2", "giemsaStain": "gpos50"},
            {"loc": {"chr": "chr3", "start": 87800001, "end": 90900000}, "name": "p11.1", "giemsaStain": "acen"}
        ]})
    }

    #[test]
    fn test_cytoband_reader() {
        let client = MockClient::new().with_response("/modules/cytobands", cytobands_response());
        let mut reader =
            CytobandReader::new("Cytobands", "hg19", &client, Endpoints::new("http://api"));

        let all = block_on(reader.chromosome("chr3")).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[2].is_centromere());
        assert_eq!(client.requests()[0].0, "http://api/modules/cytobands/hg19/chr3");

        let features =
            block_on(reader.features(&GenomicLocation::new("chr3", 2_500_000, 3_000_000))).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].name, "p26.2");
        assert_eq!(features[1].tags, vec!["gpos50".to_string()]);

        // same chromosome, served from the cache
        assert_eq!(client.requests().len(), 1);
        block_on(reader.chromosome("chr4")).unwrap();
        assert_eq!(client.requests().len(), 2);
    }

    #[test]
    fn test_cytoband_failure_is_scoped_to_track() {
        let client = MockClient::new();
        let mut reader =
            CytobandReader::new("Cytobands", "hg19", &client, Endpoints::new("http://api"));
        let result = block_on(reader.features(&GenomicLocation::new("chr1", 1, 10)));
        assert!(matches!(result, Err(SeqBrowseError::DataFetch { .. })));
    }

    #[test]
    fn test_search_gene_encodes_symbol() {
        let client = MockClient::new().with_response("/modules/genome/info", json!([]));
        let endpoints = Endpoints::new("http://api");
        let found = block_on(search_gene(&client, &endpoints, "hg19", "BCL6 AS1&x")).unwrap();
        assert!(found.is_none());
        assert_eq!(
            client.requests()[0].0,
            "http://api/modules/genome/info/hg19?search=BCL6+AS1%26x&level=gene&mode=fuzzy"
        );
    }

    #[test]
    fn test_search_gene() {
        let response = json!({"data": [
            {"loc": {"chr": "chr3", "start": 187439165, "end": 187463513}, "level": "gene", "geneSymbol": "BCL6"}
        ]});
        let client = MockClient::new().with_response("/modules/genome/info", response);
        let found =
            block_on(search_gene(&client, &Endpoints::new("http://api"), "hg19", "BCL6")).unwrap();
        assert_eq!(found.map(|l| l.to_string()), Some("chr3:187439165-187463513".to_string()));
    }
}
