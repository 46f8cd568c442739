//! Test harness for isolated pipeline runs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use lyricset::{InputMode, LyricsSource, Pipeline, PipelineConfig, Result, RunSummary, SongSort};

/// Status output and counters captured from one run.
#[derive(Debug)]
pub struct RunOutput {
    pub summary: RunSummary,
    pub status: String,
}

impl RunOutput {
    pub fn lines(&self) -> Vec<&str> {
        self.status.lines().collect()
    }
}

/// Runs pipelines against a private temporary output directory.
pub struct TestHarness {
    temp_dir: TempDir,
    pub output_dir: PathBuf,
    pub worker_count: usize,
    pub max_songs: Option<usize>,
    pub sort: SongSort,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_dir = temp_dir.path().join("dataset");

        Self {
            temp_dir,
            output_dir,
            worker_count: 4,
            max_songs: None,
            sort: SongSort::Popularity,
        }
    }

    pub fn workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn max_songs(mut self, max_songs: usize) -> Self {
        self.max_songs = Some(max_songs);
        self
    }

    pub fn sort(mut self, sort: SongSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn base_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn pipeline(&self, source: Arc<dyn LyricsSource>) -> Pipeline {
        let config = PipelineConfig {
            output_directory: self.output_dir.clone(),
            worker_count: self.worker_count,
            max_songs: self.max_songs,
            sort: self.sort,
        };
        Pipeline::new(Arc::new(config), source)
    }

    pub fn run(
        &self,
        source: Arc<dyn LyricsSource>,
        mode: InputMode,
        input: &str,
    ) -> Result<RunOutput> {
        let mut status = Vec::new();
        let summary = self
            .pipeline(source)
            .run(mode, input.as_bytes(), &mut status)?;

        Ok(RunOutput {
            summary,
            status: String::from_utf8(status).expect("status output is UTF-8"),
        })
    }

    /// Sorted names of the files in the output directory.
    pub fn output_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.output_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn read_record(&self, id: &str) -> serde_json::Value {
        let bytes = std::fs::read(self.output_dir.join(format!("{}.json", id)))
            .expect("record file exists");
        serde_json::from_slice(&bytes).expect("record file is valid JSON")
    }

    pub fn record_bytes(&self, id: &str) -> Vec<u8> {
        std::fs::read(self.output_dir.join(format!("{}.json", id))).expect("record file exists")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
