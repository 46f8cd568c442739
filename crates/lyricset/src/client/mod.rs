//! Lookup adapters for the remote lyrics database.
//!
//! Workers only see [`LyricsSource`]: two blocking lookups that always
//! return a [`LookupOutcome`]. Transport and decoding faults are folded
//! into [`LookupOutcome::Failed`] by the adapter.

pub mod genius;
pub mod lyrics;
pub mod pacer;

use serde_json::Value;

use crate::config::SongSort;
use crate::error::LookupError;

pub use genius::GeniusClient;
pub use pacer::Pacer;

/// One song as returned by the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    /// Stable remote identifier; also the persistence key.
    pub id: String,
    pub title: String,
    /// Primary artist as reported by the remote service.
    pub artist: String,
    /// Full response object, persisted verbatim.
    pub payload: Value,
}

impl SongRecord {
    /// Builds a record from a remote song object, reading `id`, `title`
    /// and `primary_artist.name` from it.
    pub fn from_payload(payload: Value) -> Result<Self, LookupError> {
        let id = match payload.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(LookupError::Parse("song object has no id".to_string())),
        };
        let title = payload
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let artist = payload
            .pointer("/primary_artist/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id,
            title,
            artist,
            payload,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Zero or more records. An artist with no collectable songs is `Found(vec![])`.
    Found(Vec<SongRecord>),
    /// The service had no confident match for a song query.
    NotFound,
    Failed(LookupError),
}

impl LookupOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, LookupOutcome::Failed(_))
    }

    pub fn records(&self) -> &[SongRecord] {
        match self {
            LookupOutcome::Found(records) => records,
            _ => &[],
        }
    }
}

impl From<Result<Option<SongRecord>, LookupError>> for LookupOutcome {
    fn from(result: Result<Option<SongRecord>, LookupError>) -> Self {
        match result {
            Ok(Some(record)) => LookupOutcome::Found(vec![record]),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => LookupOutcome::Failed(e),
        }
    }
}

impl From<Result<Vec<SongRecord>, LookupError>> for LookupOutcome {
    fn from(result: Result<Vec<SongRecord>, LookupError>) -> Self {
        match result {
            Ok(records) => LookupOutcome::Found(records),
            Err(e) => LookupOutcome::Failed(e),
        }
    }
}

/// Search capability shared by every worker.
///
/// Implementations handle their own synchronization (pacing, connection
/// reuse); callers may invoke both methods concurrently from many threads.
pub trait LyricsSource: Send + Sync {
    /// Looks up a single song by title and artist, with full detail.
    fn lookup_song(&self, title: &str, artist: &str) -> LookupOutcome;

    /// Looks up up to `max_songs` of an artist's songs in `sort` order.
    /// Both parameters are passed to the remote service as-is.
    fn lookup_top_songs(
        &self,
        artist: &str,
        max_songs: Option<usize>,
        sort: SongSort,
    ) -> LookupOutcome;
}
