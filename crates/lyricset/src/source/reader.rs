use std::io::{BufRead, Read};

use log::{debug, info};

use crate::config::SongSort;
use crate::error::InputError;
use crate::source::item::WorkItem;

/// Shape of the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// `song,artist` CSV records.
    Songs,
    /// One artist name per line.
    Artists,
}

/// Reads one artist per line, trimmed.
///
/// Blank lines are passed through as items with an empty name.
pub fn read_artists<R: BufRead>(
    reader: R,
    max_songs: Option<usize>,
    sort: SongSort,
) -> Result<Vec<WorkItem>, InputError> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        items.push(WorkItem::artist(line.trim(), max_songs, sort));
    }

    info!("Read {} artists from input", items.len());
    Ok(items)
}

/// Reads `song,artist` CSV records.
///
/// Quoted fields are honored. When the artist field itself holds a
/// comma-separated list of collaborators, only the first one is kept.
/// Any record without exactly two fields fails the whole read.
pub fn read_song_pairs<R: Read>(reader: R) -> Result<Vec<WorkItem>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut items = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != 2 {
            return Err(InputError::MalformedRecord {
                line,
                fields: record.len(),
            });
        }

        let title = record[0].trim();
        let artist = record[1].split(',').next().unwrap_or_default().trim();
        debug!("Line {}: \"{}\" by \"{}\"", line, title, artist);
        items.push(WorkItem::song(title, artist));
    }

    info!("Read {} songs from input", items.len());
    Ok(items)
}

/// Reads the whole input in the given mode.
pub fn read_items<R: BufRead>(
    mode: InputMode,
    reader: R,
    max_songs: Option<usize>,
    sort: SongSort,
) -> Result<Vec<WorkItem>, InputError> {
    match mode {
        InputMode::Songs => read_song_pairs(reader),
        InputMode::Artists => read_artists(reader, max_songs, sort),
    }
}
