use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the wallpaper-to-scheme pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("no theme generated yet: {0}")]
    State(&'static str),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("command `{command}` failed with status {status}")]
    Subprocess { command: String, status: ExitStatus },

    #[error("command `{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("unsupported or corrupt image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("theme generation failed: {0}")]
    Generate(String),

    #[error("invalid hex color {value:?}: {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
