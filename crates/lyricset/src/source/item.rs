use std::fmt;

use crate::config::SongSort;

/// One unit of lookup work read from the input.
///
/// Identity is the field values; repeated input lines produce equal items
/// and are looked up independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Collect an artist's songs, bounded by `max_songs` and ordered by `sort`.
    Artist {
        artist: String,
        max_songs: Option<usize>,
        sort: SongSort,
    },
    /// Collect a single song.
    Song { title: String, artist: String },
}

impl WorkItem {
    pub fn artist(name: impl Into<String>, max_songs: Option<usize>, sort: SongSort) -> Self {
        WorkItem::Artist {
            artist: name.into(),
            max_songs,
            sort,
        }
    }

    pub fn song(title: impl Into<String>, artist: impl Into<String>) -> Self {
        WorkItem::Song {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// The artist string as it appeared in the input (after normalization).
    pub fn artist_name(&self) -> &str {
        match self {
            WorkItem::Artist { artist, .. } | WorkItem::Song { artist, .. } => artist,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            WorkItem::Artist { .. } => None,
            WorkItem::Song { title, .. } => Some(title),
        }
    }
}

/// Quoted query form used in status lines: `"song", "artist"` or `"artist"`.
impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkItem::Artist { artist, .. } => write!(f, "\"{}\"", artist),
            WorkItem::Song { title, artist } => write!(f, "\"{}\", \"{}\"", title, artist),
        }
    }
}
