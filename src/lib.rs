#![forbid(unsafe_code)]

//! Shared building blocks for the `youtube_subs` binary: metadata parsing,
//! language guessing, playlist expansion and the yt-dlp collaborator.

pub mod config;
pub mod error;
pub mod language;
pub mod metadata;
pub mod playlist;
pub mod subtitles;
pub mod ytdlp;
