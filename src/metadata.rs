#![forbid(unsafe_code)]

//! Typed view over `yt-dlp --dump-single-json` output.
//!
//! Only the handful of fields the subtitle pipeline reads are modelled, and
//! every one of them is optional: flat playlist entries carry little more than
//! an id, and older videos may lack a declared language entirely.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    /// Declared spoken language, e.g. `en-US`.
    pub language: Option<String>,
    /// Human-authored tracks keyed by language code. Key order follows the
    /// document.
    pub subtitles: Option<Map<String, Value>>,
    pub automatic_captions: Option<Map<String, Value>>,
    /// Present for playlists. yt-dlp occasionally emits `null` for entries it
    /// could not resolve.
    pub entries: Option<Vec<Option<PlaylistEntry>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistEntry {
    pub id: Option<String>,
    pub title: Option<String>,
}

impl VideoInfo {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Language non-empty and not just whitespace.
    pub fn declared_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
    }

    /// Caption language keys, human-authored tracks first and automatic
    /// captions second, each in document order.
    pub fn caption_languages(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.subtitles, &self.automatic_captions]
            .into_iter()
            .flatten()
            .flat_map(|tracks| tracks.keys().map(String::as_str))
    }

    /// Playlist entries that survived resolution, in playlist order.
    pub fn playlist_entries(&self) -> impl Iterator<Item = &PlaylistEntry> + '_ {
        self.entries.iter().flatten().flatten()
    }

    pub fn has_entries(&self) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| !entries.is_empty())
    }
}
