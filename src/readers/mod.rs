//! Data-source adapters behind one contract: "give me the signal or the
//! features overlapping this location".
//!
//! Each track gets a [`Reader`], chosen from its `trackType`:
//!
//!  - Seq and BED tracks query the backend through a [`SearchClient`]
//!    ([`RemoteTabularReader`]).
//!  - bigWig and bigBed tracks, remote or local, read the binary file
//!    through a [`SourceOpener`] ([`BinaryIndexedReader`]).
//!  - Local BED tracks query an in-memory index ([`LocalIndexedReader`]).
//!  - Cytoband tracks fetch the bands of the displayed chromosome
//!    ([`CytobandReader`]).
//!  - Everything else reads nothing ([`EmptyReader`]).
//!
//! "No data here" is always `Ok` with an empty result. An I/O or backend
//! failure is a [`SeqBrowseError::DataFetch`] for that track only;
//! [`fetch_signals`] and [`fetch_features`] turn such failures into empty
//! results so sibling tracks still render.

use futures::future::join_all;

use crate::{
    axis::Axis,
    bins::{Bin, ScaleMode},
    collapse::{collapse, SeriesPoint},
    error::SeqBrowseError,
    features::BedFeature,
    location::GenomicLocation,
    tracks::{Track, TrackKind},
    Position,
};

pub mod binary;
pub mod local;
pub mod remote;

pub use binary::{BinarySource, BinaryIndexedReader, LocalFiles, SourceOpener};
pub use local::LocalIndexedReader;
pub use remote::{CytobandReader, Endpoints, RemoteTabularReader, SearchClient};

/// The read contract shared by every data source.
pub trait TrackReader {
    /// The name used in logs and errors.
    fn name(&self) -> &str;

    /// Binned signal over `location`.
    async fn signal(
        &mut self,
        location: &GenomicLocation,
        bin_size: Position,
        mode: ScaleMode,
    ) -> Result<Vec<Bin>, SeqBrowseError>;

    /// BED-like features overlapping `location`.
    async fn features(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError>;

    /// The signal collapsed into a renderable vertex series.
    async fn points(
        &mut self,
        location: &GenomicLocation,
        xax: &Axis,
        yax: &Axis,
        bin_size: Position,
        smoothing_factor: f64,
        mode: ScaleMode,
    ) -> Result<Vec<SeriesPoint>, SeqBrowseError> {
        let bins = self.signal(location, bin_size, mode).await?;
        Ok(collapse(&bins, xax, yax, smoothing_factor))
    }
}

/// A reader that never has data. Used until a track's real reader exists.
#[derive(Clone, Debug, Default)]
pub struct EmptyReader {
    name: String,
}

impl EmptyReader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TrackReader for EmptyReader {
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

    async fn features(
        &mut self,
        _location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        Ok(Vec::new())
    }
}

/// A track's reader, dispatched by variant.
pub enum Reader<C> {
    Empty(EmptyReader),
    RemoteTabular(RemoteTabularReader<C>),
    BinaryIndexed(BinaryIndexedReader<Box<dyn BinarySource>>),
    LocalIndexed(LocalIndexedReader),
    Cytobands(CytobandReader<C>),
}

impl<C: SearchClient> Reader<C> {
    /// Build the reader for `track` on `genome`. Remote calls go through
    /// `client` and binary files are opened by `opener`, from the track's url
    /// or file.
    pub fn for_track(
        track: &Track,
        genome: &str,
        client: C,
        endpoints: &Endpoints,
        opener: &dyn SourceOpener,
    ) -> Result<Self, SeqBrowseError> {
        let name = track.name.clone();
        let reader = match &track.kind {
            TrackKind::Seq(seq) => Reader::RemoteTabular(RemoteTabularReader::new(
                name,
                &seq.db.public_id,
                seq.reads,
                client,
                endpoints.clone(),
            )),
            TrackKind::Bed(bed) => Reader::RemoteTabular(RemoteTabularReader::new(
                name,
                &bed.db.public_id,
                0,
                client,
                endpoints.clone(),
            )),
            TrackKind::RemoteBigWig(t) => Reader::BinaryIndexed(BinaryIndexedReader::open(
                name,
                opener.open(&t.db.url)?,
            )?),
            TrackKind::RemoteBigBed(t) => Reader::BinaryIndexed(BinaryIndexedReader::open(
                name,
                opener.open(&t.db.url)?,
            )?),
            TrackKind::LocalBigWig(t) => {
                Reader::BinaryIndexed(BinaryIndexedReader::open(name, opener.open(&t.file)?)?)
            }
            TrackKind::LocalBigBed(t) => {
                Reader::BinaryIndexed(BinaryIndexedReader::open(name, opener.open(&t.file)?)?)
            }
            TrackKind::LocalBed(t) => {
                Reader::LocalIndexed(LocalIndexedReader::from_path(name, &t.file)?)
            }
            TrackKind::Cytobands(_) => Reader::Cytobands(CytobandReader::new(
                name,
                genome,
                client,
                endpoints.clone(),
            )),
            TrackKind::Gene(_) | TrackKind::Scale(_) | TrackKind::Ruler(_) | TrackKind::Location(_) => {
                Reader::Empty(EmptyReader::new(name))
            }
        };
        Ok(reader)
    }
}

impl<C: SearchClient> TrackReader for Reader<C> {
    fn name(&self) -> &str {
        match self {
            Reader::Empty(r) => r.name(),
            Reader::RemoteTabular(r) => r.name(),
            Reader::BinaryIndexed(r) => r.name(),
            Reader::LocalIndexed(r) => r.name(),
            Reader::Cytobands(r) => r.name(),
        }
    }

    async fn signal(
        &mut self,
        location: &GenomicLocation,
        bin_size: Position,
        mode: ScaleMode,
    ) -> Result<Vec<Bin>, SeqBrowseError> {
        match self {
            Reader::Empty(r) => r.signal(location, bin_size, mode).await,
            Reader::RemoteTabular(r) => r.signal(location, bin_size, mode).await,
            Reader::BinaryIndexed(r) => r.signal(location, bin_size, mode).await,
            Reader::LocalIndexed(r) => r.signal(location, bin_size, mode).await,
            Reader::Cytobands(r) => r.signal(location, bin_size, mode).await,
        }
    }

    async fn features(
        &mut self,
        location: &GenomicLocation,
    ) -> Result<Vec<BedFeature>, SeqBrowseError> {
        match self {
            Reader::Empty(r) => r.features(location).await,
            Reader::RemoteTabular(r) => r.features(location).await,
            Reader::BinaryIndexed(r) => r.features(location).await,
            Reader::LocalIndexed(r) => r.features(location).await,
            Reader::Cytobands(r) => r.features(location).await,
        }
    }
}

fn or_empty<T>(name: &str, result: Result<Vec<T>, SeqBrowseError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        log::warn!("track '{}' will render empty: {}", name, e);
        Vec::new()
    })
}

/// Fetch the signal of every reader concurrently. A failing reader yields an
/// empty result in its slot.
pub async fn fetch_signals<R: TrackReader>(
    readers: &mut [R],
    location: &GenomicLocation,
    bin_size: Position,
    mode: ScaleMode,
) -> Vec<Vec<Bin>> {
    join_all(readers.iter_mut().map(|reader| async move {
        log::debug!("fetching signal for '{}' at {}", reader.name(), location);
        let result = reader.signal(location, bin_size, mode).await;
        or_empty(reader.name(), result)
    }))
    .await
}

/// Fetch the features of every reader concurrently. A failing reader yields
/// an empty result in its slot.
pub async fn fetch_features<R: TrackReader>(
    readers: &mut [R],
    location: &GenomicLocation,
) -> Vec<Vec<BedFeature>> {
    join_all(readers.iter_mut().map(|reader| async move {
        log::debug!("fetching features for '{}' at {}", reader.name(), location);
        let result = reader.features(location).await;
        or_empty(reader.name(), result)
    }))
    .await
}
