#![forbid(unsafe_code)]

use crate::error::Result;
use crate::metadata::VideoInfo;
use crate::ytdlp::{MetadataQuery, YtDlp};
use log::{debug, info};

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Resolves `url` into the individual videos to process, preserving playlist
/// order. A plain video URL comes back unchanged as the only element, and so
/// does a playlist whose entries carry no ids at all.
pub fn expand(tool: &dyn YtDlp, url: &str) -> Result<Vec<String>> {
    let info = tool.fetch_metadata(url, MetadataQuery::FlatPlaylist)?;
    let urls = video_urls(&info, url);
    info!("{url} expands to {} video(s)", urls.len());
    Ok(urls)
}

fn video_urls(info: &VideoInfo, url: &str) -> Vec<String> {
    if !info.has_entries() {
        return vec![url.to_string()];
    }

    let urls: Vec<String> = info
        .playlist_entries()
        .filter_map(|entry| {
            let id = entry.id.as_deref().filter(|id| !id.is_empty());
            if id.is_none() {
                debug!(
                    "skipping playlist entry without id: {}",
                    entry.title.as_deref().unwrap_or("<untitled>")
                );
            }
            id.map(watch_url)
        })
        .collect();

    if urls.is_empty() {
        vec![url.to_string()]
    } else {
        urls
    }
}
