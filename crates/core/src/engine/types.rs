//! Types for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How an output file was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeMode {
    /// Decoded and re-encoded into the target format.
    Reencoded,
    /// Input already had the target format; validated and copied.
    Copied,
}

/// Result of a successful transcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeReport {
    /// Input file path.
    pub input_path: PathBuf,
    /// Final output file path.
    pub output_path: PathBuf,
    /// Target format token.
    pub target_format: String,
    /// Whether the file was re-encoded or copied.
    pub mode: TranscodeMode,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}
