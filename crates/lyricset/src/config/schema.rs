use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub genius: GeniusConfig,
    #[serde(default)]
    pub artist: ArtistConfig,
}

fn default_output_directory() -> String {
    "./dataset".to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            worker_count: default_worker_count(),
            genius: GeniusConfig::default(),
            artist: ArtistConfig::default(),
        }
    }
}

/// Connection and filtering options for the Genius adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeniusConfig {
    /// Direct token value. Prefer `access_token_file` or the env var.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_token_file: Option<String>,
    #[serde(default = "default_token_env_var")]
    pub access_token_env_var: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Minimum spacing between two requests, shared by all workers.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub skip_non_songs: bool,
    /// Extra title patterns (regex, case-insensitive) that mark a result as a non-song.
    #[serde(default)]
    pub excluded_terms: Vec<String>,
    #[serde(default = "default_true")]
    pub full_info: bool,
    #[serde(default = "default_true")]
    pub fetch_lyrics: bool,
    #[serde(default)]
    pub remove_section_headers: bool,
}

fn default_token_env_var() -> String {
    "GENIUS_ACCESS_TOKEN".to_string()
}

fn default_api_base_url() -> String {
    "https://api.genius.com".to_string()
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("lyricset/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

impl Default for GeniusConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            access_token_file: None,
            access_token_env_var: default_token_env_var(),
            api_base_url: default_api_base_url(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            skip_non_songs: true,
            excluded_terms: vec![],
            full_info: true,
            fetch_lyrics: true,
            remove_section_headers: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistConfig {
    /// Upper bound on songs collected per artist. `None` collects the whole catalog.
    #[serde(default)]
    pub max_songs: Option<usize>,
    #[serde(default)]
    pub sort: SongSort,
}

/// Ordering of an artist's song listing, passed through to the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongSort {
    #[default]
    Popularity,
    Title,
}

impl SongSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongSort::Popularity => "popularity",
            SongSort::Title => "title",
        }
    }
}

impl fmt::Display for SongSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SongSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "popularity" => Ok(SongSort::Popularity),
            "title" => Ok(SongSort::Title),
            other => Err(format!(
                "unknown sort order '{}' (expected 'popularity' or 'title')",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.output_directory, "./dataset");
        assert!(config.worker_count > 0);
        assert_eq!(config.genius.access_token_env_var, "GENIUS_ACCESS_TOKEN");
        assert_eq!(config.genius.api_base_url, "https://api.genius.com");
        assert_eq!(config.genius.request_delay_ms, 200);
        assert!(config.genius.skip_non_songs);
        assert!(config.genius.fetch_lyrics);
        assert!(!config.genius.remove_section_headers);
        assert_eq!(config.artist.max_songs, None);
        assert_eq!(config.artist.sort, SongSort::Popularity);
    }

    #[test]
    fn test_song_sort_serde_lowercase() {
        let sort: SongSort = serde_json::from_str("\"title\"").unwrap();
        assert_eq!(sort, SongSort::Title);
        assert_eq!(serde_json::to_string(&SongSort::Popularity).unwrap(), "\"popularity\"");
    }

    #[test]
    fn test_song_sort_from_str() {
        assert_eq!("Popularity".parse::<SongSort>().unwrap(), SongSort::Popularity);
        assert_eq!("title".parse::<SongSort>().unwrap(), SongSort::Title);
        assert!("release_date".parse::<SongSort>().is_err());
    }
}
