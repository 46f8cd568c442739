//! Result filtering and lyrics page extraction.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

/// Title patterns that mark a search result as something other than a song.
pub const DEFAULT_EXCLUDED_TERMS: &[&str] = &[
    r"track\s?list",
    r"album art(work)?",
    r"liner notes",
    r"booklet",
    r"credits",
    r"interview",
    r"skit",
    r"instrumental",
    r"setlist",
];

const CONTAINER_MARKER: &str = "data-lyrics-container=\"true\"";

static RE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());
static RE_SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Decides whether a remote song object is worth collecting.
pub struct ResultFilter {
    skip_non_songs: bool,
    excluded: Regex,
}

impl ResultFilter {
    /// Builds the filter from the default excluded terms plus `extra_terms`.
    pub fn new(skip_non_songs: bool, extra_terms: &[String]) -> Result<Self, regex::Error> {
        let alternation = DEFAULT_EXCLUDED_TERMS
            .iter()
            .map(|t| t.to_string())
            .chain(extra_terms.iter().cloned())
            .map(|t| format!("({})", t))
            .collect::<Vec<_>>()
            .join("|");
        let excluded = Regex::new(&format!("(?i){}", alternation))?;

        Ok(Self {
            skip_non_songs,
            excluded,
        })
    }

    /// True when the song has complete lyrics and its title is not an excluded term.
    pub fn is_lyrics(&self, song: &Value) -> bool {
        if !self.skip_non_songs {
            return true;
        }
        has_complete_lyrics(song) && !self.excluded.is_match(&normalize(title_of(song)))
    }
}

pub fn has_complete_lyrics(song: &Value) -> bool {
    let complete = song.get("lyrics_state").and_then(Value::as_str) == Some("complete");
    let instrumental = song
        .get("instrumental")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    complete && !instrumental
}

pub fn title_of(song: &Value) -> &str {
    song.get("title").and_then(Value::as_str).unwrap_or_default()
}

/// Lowercases, trims and strips ASCII punctuation for loose title comparison.
pub fn normalize(s: &str) -> String {
    s.replace('\u{200b}', " ")
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Extracts the lyrics text from a song page.
///
/// Returns `None` when the page has no lyrics container.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let mut blocks = Vec::new();
    let mut rest = html;

    while let Some(marker) = rest.find(CONTAINER_MARKER) {
        let Some(tag_end) = rest[marker..].find('>') else {
            break;
        };
        let body = &rest[marker + tag_end + 1..];
        let body_len = matching_div_end(body);
        blocks.push(html_to_text(&body[..body_len]));
        rest = &body[body_len..];
    }

    if blocks.is_empty() {
        return None;
    }

    Some(blocks.join("\n").trim().to_string())
}

/// Strips `[Verse 1]` style headers and the blank lines they leave behind.
pub fn remove_section_headers(lyrics: &str) -> String {
    let stripped = RE_SECTION_HEADER.replace_all(lyrics, "");
    RE_BLANK_RUN.replace_all(&stripped, "\n").trim().to_string()
}

/// Offset of the `</div>` that closes the element whose body starts at `body`.
fn matching_div_end(body: &str) -> usize {
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = body[pos..].find('<') {
        let at = pos + offset;
        let tag = &body[at..];
        if tag.starts_with("</div") {
            if depth == 0 {
                return at;
            }
            depth -= 1;
        } else if tag.starts_with("<div") {
            depth += 1;
        }
        pos = at + 1;
    }

    body.len()
}

fn html_to_text(fragment: &str) -> String {
    let with_breaks = RE_BREAK.replace_all(fragment, "\n");
    let without_tags = RE_TAG.replace_all(&with_breaks, "");
    decode_entities(&without_tags)
}

fn decode_entities(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
