pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod secrets;
pub mod sink;
pub mod source;
pub mod storage;
pub mod worker;

pub use client::{GeniusClient, LookupOutcome, LyricsSource, SongRecord};
pub use config::{load_config, ArtistConfig, Config, GeniusConfig, SongSort};
pub use error::{
    ConfigError, InputError, LookupError, LyricsetError, Result, StorageError, WorkerError,
};
pub use pipeline::{Pipeline, PipelineConfig};
pub use secrets::{resolve_secret, SecretError};
pub use sink::{ResultSink, RunSummary};
pub use source::{InputMode, WorkItem};
pub use worker::{Collection, CollectionResult, Collector};
