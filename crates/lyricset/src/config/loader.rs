use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Location of the per-user config file, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lyricset").join("config.json"))
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be greater than 0".to_string(),
        });
    }

    if config.output_directory.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "output_directory must not be empty".to_string(),
        });
    }

    if config.genius.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "genius.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.genius.api_base_url.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "genius.api_base_url must not be empty".to_string(),
        });
    }

    if config.artist.max_songs == Some(0) {
        return Err(ConfigError::Validation {
            message: "artist.max_songs must be greater than 0 when set".to_string(),
        });
    }

    for term in &config.genius.excluded_terms {
        if let Err(e) = regex::Regex::new(term) {
            return Err(ConfigError::InvalidPattern {
                term: term.clone(),
                reason: e.to_string(),
            });
        }
    }

    Ok(())
}
