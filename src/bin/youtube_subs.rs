#![forbid(unsafe_code)]

//! Downloads subtitle tracks for a YouTube video or playlist, preferring the
//! original spoken language and a secondary language.
//!
//! yt-dlp does the actual extraction. This binary resolves settings, expands
//! playlists and runs one subtitle-only yt-dlp call per video, stopping at the
//! first failure.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{LevelFilter, debug};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use youtube_subs::config::{SettingsOverrides, resolve_settings};
use youtube_subs::subtitles::{FetchOptions, download_all, prepare_output_dir};
use youtube_subs::ytdlp::{YtDlpProcess, ensure_program_available};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Download YouTube subtitles with language priority
#[derive(Parser, Debug)]
#[command(name = "youtube_subs", version)]
#[command(long_about = "Download YouTube subtitles with language priority.

For every video the original language is guessed from yt-dlp metadata and
subtitles are requested as <orig>.*,<secondary>.*,<orig>,<secondary>.

ENVIRONMENT (also read from the env file):
    YT_SUBS_OUT, YT_SUBS_FORMAT, YT_SUBS_SECONDARY_LANG, YT_DLP_BIN, YT_SUBS_COOKIES")]
struct Cli {
    /// YouTube video or playlist URL
    url: String,

    /// Output directory [default: ./subs]
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Subtitle format preference [default: vtt/srt/best]
    #[arg(long, value_name = "PREF")]
    format: Option<String>,

    /// Language requested after the original one [default: ko]
    #[arg(long, value_name = "LANG")]
    secondary_lang: Option<String>,

    /// yt-dlp executable [default: yt-dlp]
    #[arg(long = "yt-dlp", value_name = "PATH")]
    yt_dlp: Option<PathBuf>,

    /// Netscape cookies file handed to yt-dlp
    #[arg(long, value_name = "PATH")]
    cookies: Option<PathBuf>,

    /// Env file with default settings [default: .env]
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Set logging level (overrides RUST_LOG)
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            out_dir: self.out.clone(),
            sub_format: self.format.clone(),
            secondary_lang: self.secondary_lang.clone(),
            yt_dlp_bin: self.yt_dlp.clone(),
            cookies: self.cookies.clone(),
            env_path: self.env_file.clone(),
        }
    }
}

fn init_logging(level: Option<CliLogLevel>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.format_timestamp(None).init();
}

fn run(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli.overrides()).context("loading settings")?;
    debug!("settings: {settings:?}");

    ensure_program_available(&settings.yt_dlp_bin)?;
    let out_dir = prepare_output_dir(&settings.out_dir)?;

    let tool = YtDlpProcess::new(settings.yt_dlp_bin).with_cookies(settings.cookies);
    let options = FetchOptions {
        out_dir,
        sub_format: settings.sub_format,
        secondary_lang: settings.secondary_lang,
    };

    let stdout = io::stdout();
    download_all(&tool, &cli.url, &options, &mut stdout.lock())
}

/// Writes `error: <message>` for a failed run and returns the exit status.
fn report(result: Result<()>, stderr: &mut dyn Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            let _ = writeln!(stderr, "error: {err:#}");
            1
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result = run(&cli);
    ExitCode::from(report(result, &mut io::stderr()))
}
