use std::path::PathBuf;

use crate::config::{Config, SongSort};

pub struct PipelineConfig {
    pub output_directory: PathBuf,
    pub worker_count: usize,
    pub max_songs: Option<usize>,
    pub sort: SongSort,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_directory: PathBuf::from(&config.output_directory),
            worker_count: config.worker_count,
            max_songs: config.artist.max_songs,
            sort: config.artist.sort,
        }
    }
}
