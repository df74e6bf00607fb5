#![forbid(unsafe_code)]

use crate::error::{Result, SubsError};
use crate::language::{DEFAULT_SECONDARY_LANG, guess_lang, language_preference};
use crate::playlist::expand;
use crate::ytdlp::{MetadataQuery, SubtitleRequest, YtDlp};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_SUB_FORMAT: &str = "vtt/srt/best";
const PROGRESS_PREFIX: &str = "[youtube-subs]";

/// Per-run settings shared by every video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub out_dir: PathBuf,
    pub sub_format: String,
    pub secondary_lang: String,
}

impl FetchOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            sub_format: DEFAULT_SUB_FORMAT.to_string(),
            secondary_lang: DEFAULT_SECONDARY_LANG.to_string(),
        }
    }
}

/// Creates `path` with its parents and returns the canonical absolute form.
pub fn prepare_output_dir(path: &Path) -> Result<PathBuf> {
    let wrap = |source| SubsError::OutputDir {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(path).map_err(wrap)?;
    fs::canonicalize(path).map_err(wrap)
}

/// Downloads the subtitle tracks of one video into `options.out_dir`.
pub fn fetch(tool: &dyn YtDlp, video_url: &str, options: &FetchOptions) -> Result<()> {
    let info = tool.fetch_metadata(video_url, MetadataQuery::SingleVideo)?;
    if let Some(title) = &info.title {
        debug!("{video_url}: {title}");
    }
    let original = guess_lang(&info);
    let languages = language_preference(&original, &options.secondary_lang);
    info!("{video_url}: original language {original}, requesting {languages}");

    let request = SubtitleRequest::new(languages, &options.sub_format, &options.out_dir);
    let status = tool.download_subtitles(video_url, &request)?;
    if !status.success() {
        return Err(SubsError::DownloadFailure {
            command: status.command,
            code: status.code,
        });
    }
    Ok(())
}

/// Expands `url` and fetches every resulting video in order, announcing each
/// one on `progress`. The first failure stops the run.
pub fn download_all(
    tool: &dyn YtDlp,
    url: &str,
    options: &FetchOptions,
    progress: &mut dyn Write,
) -> anyhow::Result<()> {
    let urls = expand(tool, url)?;
    for video_url in &urls {
        writeln!(
            progress,
            "{PROGRESS_PREFIX} downloading subtitles for: {video_url}"
        )?;
        fetch(tool, video_url, options)?;
    }
    writeln!(
        progress,
        "{PROGRESS_PREFIX} done. output: {}",
        options.out_dir.display()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ytdlp::testing::{Call, FakeYtDlp};
    use anyhow::Result;
    use tempfile::tempdir;

    const PLAYLIST: &str = "https://www.youtube.com/playlist?list=PLx";
    const X1: &str = "https://www.youtube.com/watch?v=x1";
    const X2: &str = "https://www.youtube.com/watch?v=x2";

    fn playlist_tool() -> FakeYtDlp {
        FakeYtDlp::new()
            .with_metadata(PLAYLIST, r#"{"entries": [{"id": "x1"}, {"id": "x2"}]}"#)
            .with_metadata(X1, r#"{"id": "x1", "language": "fr-CA"}"#)
            .with_metadata(X2, r#"{"id": "x2", "automatic_captions": {"ja": []}}"#)
    }

    fn options() -> FetchOptions {
        FetchOptions::new("/tmp/subs-out")
    }

    #[test]
    fn fetch_builds_request_from_guessed_language() -> Result<()> {
        let tool = playlist_tool();
        fetch(&tool, X1, &options())?;

        assert_eq!(
            tool.metadata_calls(),
            vec![(X1.to_string(), MetadataQuery::SingleVideo)]
        );
        let downloads = tool.download_calls();
        assert_eq!(downloads.len(), 1);
        let (url, request) = &downloads[0];
        assert_eq!(url, X1);
        assert_eq!(request.languages, "fr.*,ko.*,fr,ko");
        assert_eq!(request.sub_format, "vtt/srt/best");
        assert_eq!(request.out_dir, PathBuf::from("/tmp/subs-out"));
        assert!(request.skip_video && request.write_subs && request.write_auto_subs);
        Ok(())
    }

    #[test]
    fn fetch_uses_configured_secondary_language() -> Result<()> {
        let tool = playlist_tool();
        let options = FetchOptions {
            sub_format: "srt".into(),
            secondary_lang: "de".into(),
            ..options()
        };
        fetch(&tool, X2, &options)?;
        let (_, request) = &tool.download_calls()[0];
        assert_eq!(request.languages, "ja.*,de.*,ja,de");
        assert_eq!(request.sub_format, "srt");
        Ok(())
    }

    #[test]
    fn fetch_reports_download_failure() {
        let tool = playlist_tool().failing_download(X1);
        let err = fetch(&tool, X1, &options()).unwrap_err();
        match err {
            SubsError::DownloadFailure { command, code } => {
                assert_eq!(code, Some(1));
                assert!(command.starts_with("yt-dlp --skip-download"));
                assert!(command.ends_with(X1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fetch_skips_download_when_metadata_fails() {
        let tool = FakeYtDlp::new();
        let err = fetch(&tool, X1, &options()).unwrap_err();
        assert!(matches!(err, SubsError::ExternalTool { .. }));
        assert!(tool.download_calls().is_empty());
    }

    #[test]
    fn download_all_walks_playlist_in_order() -> Result<()> {
        let tool = playlist_tool();
        let mut out = Vec::new();
        download_all(&tool, PLAYLIST, &options(), &mut out)?;

        assert_eq!(
            tool.calls(),
            vec![
                Call::Metadata(PLAYLIST.to_string(), MetadataQuery::FlatPlaylist),
                Call::Metadata(X1.to_string(), MetadataQuery::SingleVideo),
                Call::Download(
                    X1.to_string(),
                    SubtitleRequest::new(
                        "fr.*,ko.*,fr,ko".into(),
                        "vtt/srt/best",
                        Path::new("/tmp/subs-out"),
                    ),
                ),
                Call::Metadata(X2.to_string(), MetadataQuery::SingleVideo),
                Call::Download(
                    X2.to_string(),
                    SubtitleRequest::new(
                        "ja.*,ko.*,ja,ko".into(),
                        "vtt/srt/best",
                        Path::new("/tmp/subs-out"),
                    ),
                ),
            ]
        );

        let printed = String::from_utf8(out)?;
        assert_eq!(
            printed.lines().collect::<Vec<_>>(),
            vec![
                "[youtube-subs] downloading subtitles for: https://www.youtube.com/watch?v=x1",
                "[youtube-subs] downloading subtitles for: https://www.youtube.com/watch?v=x2",
                "[youtube-subs] done. output: /tmp/subs-out",
            ]
        );
        Ok(())
    }

    #[test]
    fn download_all_stops_at_first_failure() {
        let tool = playlist_tool().failing_download(X1);
        let mut out = Vec::new();
        let err = download_all(&tool, PLAYLIST, &options(), &mut out).unwrap_err();
        assert!(err.to_string().starts_with("command failed: "));

        assert_eq!(tool.download_calls().len(), 1);
        assert!(
            !tool
                .metadata_calls()
                .iter()
                .any(|(url, _)| url == X2)
        );
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 1);
        assert!(!printed.contains("done."));
    }

    #[test]
    fn download_all_single_video() -> Result<()> {
        let tool = FakeYtDlp::new().with_metadata(X1, r#"{"id": "x1"}"#);
        let mut out = Vec::new();
        download_all(&tool, X1, &options(), &mut out)?;
        let (_, request) = &tool.download_calls()[0];
        assert_eq!(request.languages, "en.*,ko.*,en,ko");
        assert_eq!(String::from_utf8(out)?.lines().count(), 2);
        Ok(())
    }

    #[test]
    fn prepare_output_dir_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b").join("subs");
        let resolved = prepare_output_dir(&nested)?;
        assert!(nested.is_dir());
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(&nested)?);
        assert_eq!(prepare_output_dir(&nested)?, resolved);
        Ok(())
    }

    #[test]
    fn prepare_output_dir_rejects_file_path() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("taken");
        fs::write(&file, "x")?;
        let err = prepare_output_dir(&file.join("subs")).unwrap_err();
        assert!(matches!(err, SubsError::OutputDir { .. }));

        let cause = std::error::Error::source(&err)
            .map(ToString::to_string)
            .unwrap_or_default();
        assert!(!cause.is_empty());
        let rendered = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(rendered.matches(cause.as_str()).count(), 1);
        Ok(())
    }
}
