//! Error types for the discovery module.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort discovery of an input path.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The input path does not exist.
    #[error("Input path does not exist: {path}")]
    NotFound { path: PathBuf },

    /// The input path exists but could not be read.
    #[error("Failed to read input path: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    /// Creates an I/O error for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
