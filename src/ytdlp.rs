#![forbid(unsafe_code)]

//! Everything that talks to the `yt-dlp` executable.
//!
//! The rest of the crate only sees the [`YtDlp`] trait so tests can swap in a
//! canned implementation. [`YtDlpProcess`] is the real thing: it spawns the
//! binary, parses `--dump-single-json` output and runs subtitle downloads with
//! inherited stdio so yt-dlp's own progress stays visible.

use crate::error::{Result, SubsError};
use crate::metadata::VideoInfo;
use anyhow::bail;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_YT_DLP_BIN: &str = "yt-dlp";

/// Output path template relative to the `-P` directory.
pub const OUTPUT_TEMPLATE: &str = "%(playlist_title|NA)s/%(title)s [%(id)s].%(ext)s";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataQuery {
    /// Resolve a playlist without descending into every video.
    FlatPlaylist,
    /// Full metadata for exactly one video, no media download.
    SingleVideo,
}

/// Options for one subtitle-only yt-dlp run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRequest {
    pub skip_video: bool,
    pub write_subs: bool,
    pub write_auto_subs: bool,
    /// `--sub-langs` selector, see [`crate::language::language_preference`].
    pub languages: String,
    /// Slash-separated format preference such as `vtt/srt/best`.
    pub sub_format: String,
    pub out_dir: PathBuf,
    pub output_template: String,
}

impl SubtitleRequest {
    pub fn new(languages: String, sub_format: &str, out_dir: &Path) -> Self {
        Self {
            skip_video: true,
            write_subs: true,
            write_auto_subs: true,
            languages,
            sub_format: sub_format.to_string(),
            out_dir: out_dir.to_path_buf(),
            output_template: OUTPUT_TEMPLATE.to_string(),
        }
    }
}

/// Result of a subtitle download invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadStatus {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// The command line that ran, for diagnostics.
    pub command: String,
}

impl DownloadStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait YtDlp {
    fn fetch_metadata(&self, url: &str, query: MetadataQuery) -> Result<VideoInfo>;

    fn download_subtitles(&self, url: &str, request: &SubtitleRequest) -> Result<DownloadStatus>;
}

pub fn metadata_args(url: &str, query: MetadataQuery, cookies: Option<&Path>) -> Vec<String> {
    let mut args = vec!["--dump-single-json".to_string()];
    match query {
        MetadataQuery::FlatPlaylist => args.push("--flat-playlist".to_string()),
        MetadataQuery::SingleVideo => {
            args.push("--skip-download".to_string());
            args.push("--no-playlist".to_string());
        }
    }
    push_cookies(&mut args, cookies);
    args.push(url.to_string());
    args
}

pub fn subtitle_args(url: &str, request: &SubtitleRequest, cookies: Option<&Path>) -> Vec<String> {
    let mut args = Vec::new();
    if request.skip_video {
        args.push("--skip-download".to_string());
    }
    if request.write_subs {
        args.push("--write-subs".to_string());
    }
    if request.write_auto_subs {
        args.push("--write-auto-subs".to_string());
    }
    args.extend([
        "--sub-langs".to_string(),
        request.languages.clone(),
        "--sub-format".to_string(),
        request.sub_format.clone(),
        "-P".to_string(),
        request.out_dir.to_string_lossy().into_owned(),
        "-o".to_string(),
        request.output_template.clone(),
    ]);
    push_cookies(&mut args, cookies);
    args.push(url.to_string());
    args
}

fn push_cookies(args: &mut Vec<String>, cookies: Option<&Path>) {
    if let Some(path) = cookies {
        args.push("--cookies".to_string());
        args.push(path.to_string_lossy().into_owned());
    }
}

/// Spawns a real yt-dlp binary for every call.
#[derive(Debug, Clone)]
pub struct YtDlpProcess {
    program: PathBuf,
    cookies: Option<PathBuf>,
}

impl YtDlpProcess {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cookies: None,
        }
    }

    /// Passes `--cookies <path>` on every call. A file that does not exist is
    /// ignored with a warning.
    pub fn with_cookies(mut self, path: Option<PathBuf>) -> Self {
        self.cookies = match path {
            Some(path) if path.exists() => Some(path),
            Some(path) => {
                warn!("cookies file {} not found, continuing without it", path.display());
                None
            }
            None => None,
        };
        self
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn spawn_error(&self, command: String, err: std::io::Error) -> SubsError {
        SubsError::ExternalTool {
            command,
            message: format!("could not run {}: {err}", self.program.display()),
        }
    }
}

impl YtDlp for YtDlpProcess {
    fn fetch_metadata(&self, url: &str, query: MetadataQuery) -> Result<VideoInfo> {
        let args = metadata_args(url, query, self.cookies.as_deref());
        let command = self.command_line(&args);
        debug!("running {command}");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.spawn_error(command.clone(), err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                "command failed".to_string()
            } else {
                stderr.to_string()
            };
            return Err(SubsError::ExternalTool { command, message });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        VideoInfo::from_json(&stdout).map_err(|err| SubsError::ExternalTool {
            command,
            message: format!("could not parse yt-dlp output for {url}: {err}"),
        })
    }

    fn download_subtitles(&self, url: &str, request: &SubtitleRequest) -> Result<DownloadStatus> {
        let args = subtitle_args(url, request, self.cookies.as_deref());
        let command = self.command_line(&args);
        debug!("running {command}");

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .map_err(|err| self.spawn_error(command.clone(), err))?;

        Ok(DownloadStatus {
            code: status.code(),
            command,
        })
    }
}

/// Runs `<program> --version` to fail loudly when yt-dlp is missing.
pub fn ensure_program_available(program: &Path) -> anyhow::Result<()> {
    let status = Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(_) => bail!(
            "{} is installed but returned a failure status",
            program.display()
        ),
        Err(err) => bail!(
            "{} is not installed or not in PATH: {}",
            program.display(),
            err
        ),
    }
}
