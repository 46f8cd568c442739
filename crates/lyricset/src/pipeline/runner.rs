use std::io::{BufRead, Write};
use std::sync::Arc;

use log::info;
use tracing::info_span;

use crate::client::LyricsSource;
use crate::error::{ConfigError, Result};
use crate::sink::{ResultSink, RunSummary};
use crate::source::{read_items, InputMode};
use crate::storage::RecordStore;
use crate::worker::Collector;

use super::config::PipelineConfig;

/// One collection run: read items, look them up concurrently, persist.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    source: Arc<dyn LyricsSource>,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, source: Arc<dyn LyricsSource>) -> Self {
        Self { config, source }
    }

    /// Runs every item in `input` and writes status lines to `out`.
    ///
    /// The whole input is parsed before any lookup starts, so malformed
    /// input fails the run without touching the remote service. Per-item
    /// lookup and write failures are reported in the summary instead.
    pub fn run<R, W>(&self, mode: InputMode, input: R, out: W) -> Result<RunSummary>
    where
        R: BufRead,
        W: Write,
    {
        let _run_span = info_span!("run",
            mode = ?mode,
            output = %self.config.output_directory.display(),
            workers = self.config.worker_count,
        )
        .entered();

        if self.config.worker_count == 0 {
            return Err(ConfigError::Validation {
                message: "worker_count must be greater than 0".to_string(),
            }
            .into());
        }

        let items = {
            let _step = info_span!("read_input").entered();
            read_items(mode, input, self.config.max_songs, self.config.sort)?
        };

        let store = RecordStore::new(&self.config.output_directory);
        store.ensure_directory()?;

        let _step = info_span!("collect").entered();
        let collector = Collector::new(Arc::clone(&self.source), self.config.worker_count);
        let collection = collector.collect(items)?;
        info!(
            "Collecting {} items into {}",
            collection.remaining(),
            store.output_directory().display()
        );

        let mut sink = ResultSink::new(store, out);
        sink.consume(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LookupOutcome, SongRecord};
    use crate::config::SongSort;
    use crate::error::{InputError, LyricsetError};
    use serde_json::json;
    use tempfile::TempDir;

    struct EchoSource;

    impl LyricsSource for EchoSource {
        fn lookup_song(&self, title: &str, artist: &str) -> LookupOutcome {
            LookupOutcome::Found(vec![SongRecord {
                id: title.to_lowercase(),
                title: title.to_string(),
                artist: artist.to_string(),
                payload: json!({ "title": title }),
            }])
        }

        fn lookup_top_songs(&self, _: &str, _: Option<usize>, _: SongSort) -> LookupOutcome {
            LookupOutcome::Found(vec![])
        }
    }

    fn pipeline(dir: &TempDir, worker_count: usize) -> Pipeline {
        let config = PipelineConfig {
            output_directory: dir.path().join("out"),
            worker_count,
            max_songs: None,
            sort: SongSort::Popularity,
        };
        Pipeline::new(Arc::new(config), Arc::new(EchoSource))
    }

    #[test]
    fn test_run_writes_records_and_status() {
        let temp_dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        let summary = pipeline(&temp_dir, 2)
            .run(InputMode::Songs, "Alpha,X\nBeta,Y\n".as_bytes(), &mut out)
            .unwrap();

        assert_eq!(summary.items, 2);
        assert_eq!(summary.records_written, 2);
        assert!(temp_dir.path().join("out/alpha.json").exists());
        assert!(temp_dir.path().join("out/beta.json").exists());
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_malformed_input_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        let err = pipeline(&temp_dir, 2)
            .run(InputMode::Songs, "Alpha,X\nOnlyOneField\n".as_bytes(), &mut out)
            .unwrap_err();

        assert!(matches!(
            err,
            LyricsetError::Input(InputError::MalformedRecord { line: 2, fields: 1 })
        ));
        assert!(out.is_empty());
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_zero_workers_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = pipeline(&temp_dir, 0)
            .run(InputMode::Artists, "A\n".as_bytes(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, LyricsetError::Config(_)));
    }
}
