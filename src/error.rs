#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the subtitle pipeline.
#[derive(Error, Debug)]
pub enum SubsError {
    /// yt-dlp could not be spawned, exited non-zero or printed something that
    /// is not a metadata document.
    #[error("{message}")]
    ExternalTool { command: String, message: String },

    /// The subtitle download step exited with a failure status.
    #[error("command failed: {command}")]
    DownloadFailure { command: String, code: Option<i32> },

    #[error("could not prepare output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = SubsError> = std::result::Result<T, E>;
