//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transcoding a single file.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// No encoder mapping exists for the requested target.
    #[error("Unsupported target format: {format}")]
    UnsupportedTarget { format: String },

    /// The input holds no decodable stream of the expected kind.
    #[error("No usable media stream in {path}: {reason}")]
    NoMediaStream { path: PathBuf, reason: String },

    /// An external tool binary could not be started.
    #[error("Tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The encoder ran but did not produce an output.
    #[error("Transcode failed: {reason}")]
    TranscodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Transcode timed out.
    #[error("Transcode timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while staging or publishing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates a transcode failed error with optional stderr output.
    pub fn transcode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::TranscodeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a no-media-stream error.
    pub fn no_media_stream(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::NoMediaStream {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether running the same file again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
