//! Persists collected records and reports per-item status lines.

use std::io::Write;

use log::{info, warn};

use crate::client::{LookupOutcome, SongRecord};
use crate::error::{LyricsetError, StorageError};
use crate::storage::RecordStore;
use crate::worker::CollectionResult;

/// Counters for one run. Logged, never printed to the status stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub items: usize,
    pub records_written: usize,
    /// Items that resolved to no records.
    pub empty: usize,
    pub failed: usize,
    pub write_failures: usize,
}

/// Consumes collector results on the calling thread.
///
/// Writes each record through the [`RecordStore`] and one status line per
/// record or per empty/failed item to `out`:
///
/// ```text
/// [+] "Yesterday", "The Beatles", "42"
/// [-] "Nonexistent Song", "Nobody"
/// [!] "Yesterday", "The Beatles": request timed out: ...
/// ```
pub struct ResultSink<W: Write> {
    store: RecordStore,
    out: W,
}

impl<W: Write> ResultSink<W> {
    pub fn new(store: RecordStore, out: W) -> Self {
        Self { store, out }
    }

    /// Drains `results`, returning counters once every result is handled.
    ///
    /// A record that cannot be written is reported and counted, and the
    /// run continues. Failing to write a status line aborts.
    pub fn consume<I>(&mut self, results: I) -> Result<RunSummary, LyricsetError>
    where
        I: IntoIterator<Item = CollectionResult>,
    {
        let mut summary = RunSummary::default();

        for result in results {
            summary.items += 1;
            self.handle(&result, &mut summary)?;
        }

        info!(
            "Run finished: {} items, {} records written, {} empty, {} failed, {} write failures",
            summary.items,
            summary.records_written,
            summary.empty,
            summary.failed,
            summary.write_failures
        );
        Ok(summary)
    }

    fn handle(
        &mut self,
        result: &CollectionResult,
        summary: &mut RunSummary,
    ) -> Result<(), LyricsetError> {
        match &result.outcome {
            LookupOutcome::Found(records) if !records.is_empty() => {
                let artist = result.item.artist_name();
                for record in records {
                    match self.store.store(record) {
                        Ok(_) => {
                            summary.records_written += 1;
                            self.emit(&format!("[+] {}", record_label(record, artist)))?;
                        }
                        Err(e) => {
                            summary.write_failures += 1;
                            self.report_write_failure(record, artist, &e)?;
                        }
                    }
                }
            }
            LookupOutcome::Found(_) | LookupOutcome::NotFound => {
                summary.empty += 1;
                self.emit(&format!("[-] {}", result.item))?;
            }
            LookupOutcome::Failed(e) => {
                summary.failed += 1;
                warn!(
                    "Lookup failed for {} after {:?} (job {}): {}",
                    result.item, result.elapsed, result.job_id, e
                );
                self.emit(&format!("[!] {}: {}", result.item, e))?;
            }
        }
        Ok(())
    }

    fn report_write_failure(
        &mut self,
        record: &SongRecord,
        artist: &str,
        error: &StorageError,
    ) -> Result<(), LyricsetError> {
        warn!("Failed to persist record {}: {}", record.id, error);
        self.emit(&format!("[!] {}: {}", record_label(record, artist), error))
    }

    fn emit(&mut self, line: &str) -> Result<(), LyricsetError> {
        writeln!(self.out, "{}", line).map_err(LyricsetError::Output)?;
        self.out.flush().map_err(LyricsetError::Output)
    }
}

/// `"title", "artist", "id"`, naming the artist as it was queried rather
/// than as the remote service spells it.
fn record_label(record: &SongRecord, artist: &str) -> String {
    format!("\"{}\", \"{}\", \"{}\"", record.title, artist, record.id)
}
