#![forbid(unsafe_code)]

//! Picks the language a video is spoken in and turns it into a yt-dlp
//! `--sub-langs` selector.

use crate::metadata::VideoInfo;

pub const FALLBACK_LANG: &str = "en";
pub const DEFAULT_SECONDARY_LANG: &str = "ko";

/// yt-dlp exposes chat replays as a caption track under this key.
const LIVE_CHAT: &str = "live_chat";

/// Returns the text before the first `-`, so `en-US` becomes `en`.
pub fn primary_subtag(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Best guess at the original spoken language of a video.
///
/// The declared `language` wins. Otherwise the first caption key that is not
/// the live chat replay is used, looking at human-authored subtitles before
/// automatic captions. Falls back to [`FALLBACK_LANG`].
pub fn guess_lang(info: &VideoInfo) -> String {
    if let Some(lang) = info.declared_language() {
        return primary_subtag(lang).to_string();
    }

    info.caption_languages()
        .find(|code| !code.is_empty() && *code != LIVE_CHAT)
        .map(|code| primary_subtag(code).to_string())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// Builds the `--sub-langs` value: any regional variant of the original
/// language, any regional variant of the secondary, then both bare codes.
pub fn language_preference(original: &str, secondary: &str) -> String {
    format!("{original}.*,{secondary}.*,{original},{secondary}")
}
