//! Builders for scripted lookup sources and song records.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;

use lyricset::{LookupError, LookupOutcome, LyricsSource, SongRecord, SongSort};

/// Builds a record whose payload looks like a Genius song object.
pub fn song_record(id: u64, title: &str, artist: &str) -> SongRecord {
    SongRecord::from_payload(json!({
        "id": id,
        "title": title,
        "lyrics_state": "complete",
        "primary_artist": { "name": artist },
        "lyrics": format!("lyrics of {}", title),
    }))
    .expect("record payload has an id")
}

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Song { title: String, artist: String },
    TopSongs {
        artist: String,
        max_songs: Option<usize>,
        sort: SongSort,
    },
}

/// In-memory [`LyricsSource`] answering from a script keyed by query.
///
/// Song queries are keyed `"title|artist"`, artist queries by the artist
/// name. Unscripted queries resolve to `NotFound` (songs) or an empty
/// listing (artists).
#[derive(Default)]
pub struct FakeSource {
    songs: HashMap<String, LookupOutcome>,
    artists: HashMap<String, Vec<SongRecord>>,
    failures: HashMap<String, LookupError>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<Call>>,
    call_count: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(mut self, title: &str, artist: &str, record: SongRecord) -> Self {
        self.songs
            .insert(song_key(title, artist), LookupOutcome::Found(vec![record]));
        self
    }

    /// Catalog returned for an artist, truncated to the requested `max_songs`.
    pub fn with_artist(mut self, artist: &str, records: Vec<SongRecord>) -> Self {
        self.artists.insert(artist.to_string(), records);
        self
    }

    /// Makes the query (`"title|artist"` or artist name) fail.
    pub fn with_failure(mut self, key: &str, error: LookupError) -> Self {
        self.failures.insert(key.to_string(), error);
        self
    }

    /// Makes the query (`"title|artist"` or artist name) take `delay`.
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, key: &str, call: Call) -> Option<LookupError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delays.get(key) {
            std::thread::sleep(*delay);
        }
        self.failures.get(key).cloned()
    }
}

fn song_key(title: &str, artist: &str) -> String {
    format!("{}|{}", title, artist)
}

impl LyricsSource for FakeSource {
    fn lookup_song(&self, title: &str, artist: &str) -> LookupOutcome {
        let key = song_key(title, artist);
        let call = Call::Song {
            title: title.to_string(),
            artist: artist.to_string(),
        };
        if let Some(error) = self.record_call(&key, call) {
            return LookupOutcome::Failed(error);
        }
        self.songs
            .get(&key)
            .cloned()
            .unwrap_or(LookupOutcome::NotFound)
    }

    fn lookup_top_songs(
        &self,
        artist: &str,
        max_songs: Option<usize>,
        sort: SongSort,
    ) -> LookupOutcome {
        let call = Call::TopSongs {
            artist: artist.to_string(),
            max_songs,
            sort,
        };
        if let Some(error) = self.record_call(artist, call) {
            return LookupOutcome::Failed(error);
        }
        let mut records = self.artists.get(artist).cloned().unwrap_or_default();
        if let Some(limit) = max_songs {
            records.truncate(limit);
        }
        LookupOutcome::Found(records)
    }
}
