//! Error types for the orchestrator module.

use std::path::PathBuf;
use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::engine::TranscodeError;

/// Batch-level failures. Any of these aborts `convert` before a listener
/// callback fires.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input path does not exist.
    #[error("Input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    /// Discovery found nothing eligible to convert.
    #[error("No media files found in: {path}")]
    NoMediaFiles { path: PathBuf },

    /// The output root could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Discovery failed for another reason.
    #[error("Discovery failed: {0}")]
    Discovery(#[source] DiscoveryError),
}

impl From<DiscoveryError> for ConvertError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::NotFound { path } => Self::InputNotFound { path },
            other => Self::Discovery(other),
        }
    }
}

/// Failure of a single file; reported through the listener, never returned from `convert`.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Preparing the output location failed.
    #[error("Failed to prepare output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine failed to convert the file.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// The task panicked.
    #[error("Conversion task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Creates an output preparation error.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Whether running the same file again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Output { .. } => true,
            Self::Transcode(e) => e.is_retryable(),
            Self::Panicked(_) => false,
        }
    }
}
