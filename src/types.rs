use std::collections::BTreeMap;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

/// One playback record from the provider's streaming-history export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListeningEvent {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(rename = "master_metadata_track_name", default)]
    pub track_name: Option<String>,
    #[serde(rename = "master_metadata_album_artist_name", default)]
    pub artist_name: Option<String>,
    #[serde(rename = "master_metadata_album_album_name", default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub ms_played: u64,
    #[serde(default)]
    pub shuffle: Option<bool>,
    #[serde(default)]
    pub skipped: Option<bool>,
    #[serde(default)]
    pub reason_start: Option<String>,
    #[serde(default)]
    pub reason_end: Option<String>,
}

impl ListeningEvent {
    /// The leading `YYYY` of the timestamp, if the timestamp is long enough.
    pub fn year(&self) -> Option<&str> {
        self.ts.as_deref().and_then(|ts| ts.get(0..4))
    }

    /// The `MM-DD` part of the timestamp (offset 5, length 5).
    pub fn month_day(&self) -> Option<&str> {
        self.ts.as_deref().and_then(|ts| ts.get(5..10))
    }
}

/// Implemented by aggregate keys that can be shown in a ranked list.
pub trait RankKey: Ord + Clone {
    fn display_name(&self) -> Option<String>;
}

/// Artist aggregate key. `None` is the "unknown artist" bucket and is kept
/// as its own entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtistKey(pub Option<String>);

impl RankKey for ArtistKey {
    fn display_name(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Identity of a track: the (title, artist) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackKey {
    pub title: String,
    pub artist: Option<String>,
}

impl RankKey for TrackKey {
    fn display_name(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

/// Running totals for one aggregate key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub count: f64,
    pub ms_played: u64,
}

pub type Bucket<K> = BTreeMap<K, Tally>;

/// A row of a top list. Serialized as `[name, count, minutes]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub name: Option<String>,
    pub count: u64,
    pub minutes: u64,
}

impl Serialize for RankedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.name)?;
        tuple.serialize_element(&self.count)?;
        tuple.serialize_element(&self.minutes)?;
        tuple.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "songs")]
    pub top_tracks: Vec<RankedEntry>,
    #[serde(rename = "artists")]
    pub top_artists: Vec<RankedEntry>,
    #[serde(rename = "time")]
    pub total_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Cumulative(Summary),
    PerYear(BTreeMap<String, Summary>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Tracks,
    Artists,
}

impl ListKind {
    pub fn noun(self) -> &'static str {
        match self {
            ListKind::Tracks => "songs",
            ListKind::Artists => "artists",
        }
    }
}
