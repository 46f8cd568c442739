//! lyricset - collects song metadata and lyrics from Genius into a JSON dataset.
//!
//! Reads `song,artist` CSV lines (or one artist per line with `--artists`)
//! from a file or stdin, writes one `<id>.json` per song and prints a
//! status line per result on stdout. Logs go to stderr.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyricset::config::{default_config_path, validate_config};
use lyricset::{
    load_config, Config, GeniusClient, InputMode, LyricsSource, Pipeline, PipelineConfig,
    SongSort,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Command-line arguments for lyricset
#[derive(Parser, Debug)]
#[command(name = "lyricset")]
#[command(about = "Collect song metadata and lyrics from Genius into a JSON dataset")]
#[command(version)]
struct Args {
    /// Input file; `-` or omitted reads stdin
    input: Option<PathBuf>,

    /// Treat each input line as an artist and collect their songs
    #[arg(long)]
    artists: bool,

    /// Directory receiving one `<id>.json` per song [default: ./dataset]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum songs per artist (artist mode)
    #[arg(short = 'n', long)]
    max_songs: Option<usize>,

    /// Order of an artist's songs (artist mode)
    #[arg(long)]
    sort: Option<SongSort>,

    /// Number of concurrent lookups [default: number of CPUs]
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Genius API access token. Without it the config's token, token file
    /// and token env var (`GENIUS_ACCESS_TOKEN` by default) are tried in order
    #[arg(long)]
    token: Option<String>,

    /// Minimum delay between API requests, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Skip fetching lyrics pages; store song metadata only
    #[arg(long)]
    no_lyrics: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn input_mode(&self) -> InputMode {
        if self.artists {
            InputMode::Artists
        } else {
            InputMode::Songs
        }
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    /// Command-line flags take precedence over the config file.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output_directory = output.display().to_string();
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(max_songs) = self.max_songs {
            config.artist.max_songs = Some(max_songs);
        }
        if let Some(sort) = self.sort {
            config.artist.sort = sort;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.genius.request_delay_ms = delay_ms;
        }
        if self.no_lyrics {
            config.genius.fetch_lyrics = false;
        }
    }
}

fn init_logging(args: &Args) {
    // RUST_LOG wins over -v/-q when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));

    let (text, json) = match args.log_format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().with_writer(io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

fn load_effective_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                debug!("Using config file {}", path.display());
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            }
            None => Config::default(),
        },
    };

    args.apply_overrides(&mut config);
    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(p) if p == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(p) => {
            let file = File::open(p)
                .with_context(|| format!("Failed to open input file {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!("Starting lyricset v{}", env!("CARGO_PKG_VERSION"));

    let config = load_effective_config(&args)?;
    let source: Arc<dyn LyricsSource> = Arc::new(
        GeniusClient::from_config(&config.genius, args.token.as_deref())
            .context("Failed to initialize Genius client")?,
    );

    let pipeline = Pipeline::new(Arc::new(PipelineConfig::from_config(&config)), source);
    let input = open_input(args.input.as_deref())?;

    let summary = pipeline.run(args.input_mode(), input, io::stdout().lock())?;
    info!(
        items = summary.items,
        records_written = summary.records_written,
        empty = summary.empty,
        failed = summary.failed,
        write_failures = summary.write_failures,
        "Collection complete"
    );

    Ok(())
}
