use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FramecastError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    #[error("Frame {index}: {reason}")]
    InvalidFrame { index: usize, reason: String },

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl FramecastError {
    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FramecastError>;
