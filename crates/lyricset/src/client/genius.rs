//! Genius API adapter.
//!
//! Talks to the public Genius REST API (`/search`, `/songs/{id}`,
//! `/artists/{id}/songs`) and scrapes lyrics text from song pages. One
//! instance is shared by every worker; its HTTP client pools connections
//! and its [`Pacer`] spaces all requests.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::info_span;

use crate::client::lyrics::{self, ResultFilter};
use crate::client::pacer::Pacer;
use crate::client::{LookupOutcome, LyricsSource, SongRecord};
use crate::config::{GeniusConfig, SongSort};
use crate::error::{ConfigError, LookupError, LyricsetError};
use crate::secrets::resolve_secret;

/// Largest page size the artist songs endpoint accepts.
const PER_PAGE: usize = 50;

/// Maximum length for error bodies kept in `LookupError::Api`.
const MAX_ERROR_BODY_LENGTH: usize = 200;

fn truncate_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    }
}

fn map_transport_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::Timeout(e.to_string())
    } else if e.is_decode() {
        LookupError::Parse(e.to_string())
    } else {
        LookupError::Network(e.to_string())
    }
}

fn check_status(response: Response) -> Result<Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(LookupError::Unauthorized(status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => Err(LookupError::RateLimited),
        _ => {
            let body = response.text().unwrap_or_default();
            Err(LookupError::Api {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            })
        }
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Picks the hit whose title matches `title`, falling back to the first hit.
fn pick_song_hit<'a>(hits: &'a [Value], title: &str) -> Option<&'a Value> {
    let wanted = lyrics::normalize(title);
    hits.iter()
        .find(|hit| lyrics::normalize(lyrics::title_of(hit)) == wanted)
        .or_else(|| hits.first())
}

/// Picks the id of the primary artist matching `artist`, falling back to
/// the first hit's primary artist.
fn pick_artist_id(hits: &[Value], artist: &str) -> Option<String> {
    let wanted = lyrics::normalize(artist);
    let primary = |hit: &Value| hit.get("primary_artist").cloned();

    hits.iter()
        .filter_map(primary)
        .find(|a| {
            let name = a.get("name").and_then(Value::as_str).unwrap_or_default();
            lyrics::normalize(name) == wanted
        })
        .or_else(|| hits.first().and_then(primary))
        .and_then(|a| id_string(a.get("id")))
}

pub struct GeniusClient {
    http: Client,
    api_base_url: String,
    token: SecretString,
    pacer: Pacer,
    filter: ResultFilter,
    full_info: bool,
    fetch_lyrics: bool,
    remove_section_headers: bool,
}

impl GeniusClient {
    /// Builds a client with an already resolved access token.
    pub fn new(config: &GeniusConfig, token: SecretString) -> Result<Self, LyricsetError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let filter = ResultFilter::new(config.skip_non_songs, &config.excluded_terms).map_err(
            |e| ConfigError::InvalidPattern {
                term: config.excluded_terms.join(", "),
                reason: e.to_string(),
            },
        )?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
            pacer: Pacer::new(Duration::from_millis(config.request_delay_ms)),
            filter,
            full_info: config.full_info,
            fetch_lyrics: config.fetch_lyrics,
            remove_section_headers: config.remove_section_headers,
        })
    }

    /// Builds a client, resolving the token from `token_override`, then the
    /// config's direct value, token file and env var.
    pub fn from_config(
        config: &GeniusConfig,
        token_override: Option<&str>,
    ) -> Result<Self, LyricsetError> {
        let direct = token_override.or(config.access_token.as_deref());
        let token = resolve_secret(
            direct,
            config.access_token_file.as_deref(),
            Some(config.access_token_env_var.as_str()),
        )?;

        Self::new(config, token)
    }

    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, LookupError> {
        self.pacer.wait();

        let url = format!("{}{}", self.api_base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .query(query)
            .send()
            .map_err(map_transport_error)?;
        let body: Value = check_status(response)?
            .json()
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        match body {
            Value::Object(mut map) => map
                .remove("response")
                .ok_or_else(|| LookupError::Parse(format!("{} has no 'response' field", path))),
            _ => Err(LookupError::Parse(format!("{} did not return an object", path))),
        }
    }

    fn get_page(&self, url: &str) -> Result<String, LookupError> {
        self.pacer.wait();
        debug!("GET {}", url);

        let response = self.http.get(url).send().map_err(map_transport_error)?;
        check_status(response)?.text().map_err(map_transport_error)
    }

    /// Song results for a free-text query.
    fn search_songs(&self, query: &str) -> Result<Vec<Value>, LookupError> {
        let response = self.get_json("/search", &[("q", query.to_string())])?;
        let hits = response
            .get("hits")
            .and_then(Value::as_array)
            .ok_or_else(|| LookupError::Parse("search response has no hits".to_string()))?;

        Ok(hits
            .iter()
            .filter(|hit| hit.get("type").and_then(Value::as_str) == Some("song"))
            .filter_map(|hit| hit.get("result").cloned())
            .collect())
    }

    fn song_details(&self, id: &str) -> Result<Value, LookupError> {
        let mut response = self.get_json(&format!("/songs/{}", id), &[])?;
        response
            .get_mut("song")
            .map(Value::take)
            .ok_or_else(|| LookupError::Parse(format!("song {} response has no song", id)))
    }

    fn lyrics_for(&self, song: &Value) -> Result<String, LookupError> {
        if !lyrics::has_complete_lyrics(song) {
            return Ok(String::new());
        }
        let Some(url) = song.get("url").and_then(Value::as_str) else {
            return Ok(String::new());
        };

        let page = self.get_page(url)?;
        let text = match lyrics::extract_lyrics(&page) {
            Some(text) => text,
            None => {
                warn!("No lyrics container found on {}", url);
                String::new()
            }
        };

        if self.remove_section_headers {
            Ok(lyrics::remove_section_headers(&text))
        } else {
            Ok(text)
        }
    }

    /// Turns a search or listing entry into a persisted record, fetching
    /// full detail and lyrics as configured.
    fn enrich(&self, song: Value) -> Result<SongRecord, LookupError> {
        let summary = SongRecord::from_payload(song)?;

        let mut payload = if self.full_info {
            self.song_details(&summary.id)?
        } else {
            summary.payload
        };

        if self.fetch_lyrics {
            let text = self.lyrics_for(&payload)?;
            if let Value::Object(map) = &mut payload {
                map.insert("lyrics".to_string(), Value::String(text));
            }
        }

        SongRecord::from_payload(payload)
    }

    fn find_song(&self, title: &str, artist: &str) -> Result<Option<SongRecord>, LookupError> {
        let query = format!("{} {}", title, artist).trim().to_string();
        let hits = self.search_songs(&query)?;

        let Some(hit) = pick_song_hit(&hits, title) else {
            debug!("No results for \"{}\"", query);
            return Ok(None);
        };

        if !self.filter.is_lyrics(hit) {
            debug!(
                "Best result for \"{}\" is not a song: \"{}\"",
                query,
                lyrics::title_of(hit)
            );
            return Ok(None);
        }

        self.enrich(hit.clone()).map(Some)
    }

    fn find_artist_songs(
        &self,
        artist: &str,
        max_songs: Option<usize>,
        sort: SongSort,
    ) -> Result<Vec<SongRecord>, LookupError> {
        let hits = self.search_songs(artist)?;
        let Some(artist_id) = pick_artist_id(&hits, artist) else {
            info!("No artist found for \"{}\"", artist);
            return Ok(vec![]);
        };

        let path = format!("/artists/{}/songs", artist_id);
        let limit_reached = |count: usize| max_songs.is_some_and(|max| count >= max);
        let mut records = Vec::new();
        let mut page = Some(1u64);

        while let Some(n) = page {
            let response = self.get_json(
                &path,
                &[
                    ("sort", sort.as_str().to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", n.to_string()),
                ],
            )?;
            let songs = response
                .get("songs")
                .and_then(Value::as_array)
                .ok_or_else(|| LookupError::Parse(format!("{} response has no songs", path)))?;

            for song in songs {
                if limit_reached(records.len()) {
                    return Ok(records);
                }
                if !self.filter.is_lyrics(song) {
                    debug!("Skipping non-song \"{}\"", lyrics::title_of(song));
                    continue;
                }
                records.push(self.enrich(song.clone())?);
            }

            if limit_reached(records.len()) {
                break;
            }
            page = response.get("next_page").and_then(Value::as_u64);
        }

        Ok(records)
    }
}

impl LyricsSource for GeniusClient {
    fn lookup_song(&self, title: &str, artist: &str) -> LookupOutcome {
        let _span = info_span!("lookup_song", title = %title, artist = %artist).entered();
        let start = Instant::now();

        let outcome = LookupOutcome::from(self.find_song(title, artist));
        if let LookupOutcome::Failed(e) = &outcome {
            warn!("Lookup for \"{}\" by \"{}\" failed: {}", title, artist, e);
        }
        debug!("Song lookup finished in {:?}", start.elapsed());
        outcome
    }

    fn lookup_top_songs(
        &self,
        artist: &str,
        max_songs: Option<usize>,
        sort: SongSort,
    ) -> LookupOutcome {
        let _span = info_span!("lookup_top_songs", artist = %artist, sort = %sort).entered();
        let start = Instant::now();

        let outcome = LookupOutcome::from(self.find_artist_songs(artist, max_songs, sort));
        match &outcome {
            LookupOutcome::Found(records) => {
                info!("Collected {} songs for \"{}\"", records.len(), artist)
            }
            LookupOutcome::Failed(e) => warn!("Lookup for artist \"{}\" failed: {}", artist, e),
            LookupOutcome::NotFound => {}
        }
        debug!("Artist lookup finished in {:?}", start.elapsed());
        outcome
    }
}
