use std::time::Duration;

use crate::client::{LookupOutcome, LyricsSource};
use crate::source::WorkItem;

/// A work item tagged for log correlation while it moves through the pool.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub item: WorkItem,
}

impl Job {
    pub fn new(item: WorkItem) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item,
        }
    }

    /// Runs the adapter operation matching this item.
    pub fn execute(&self, source: &dyn LyricsSource) -> LookupOutcome {
        match &self.item {
            WorkItem::Song { title, artist } => source.lookup_song(title, artist),
            WorkItem::Artist {
                artist,
                max_songs,
                sort,
            } => source.lookup_top_songs(artist, *max_songs, *sort),
        }
    }
}

/// The outcome of one work item, delivered in completion order.
#[derive(Debug, Clone)]
pub struct CollectionResult {
    pub job_id: String,
    pub item: WorkItem,
    pub outcome: LookupOutcome,
    pub worker_id: usize,
    pub elapsed: Duration,
}
