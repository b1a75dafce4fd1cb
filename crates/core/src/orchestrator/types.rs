//! Types for the orchestrator module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::TaskError;

/// One batch conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// File or directory to convert.
    pub input_path: PathBuf,
    /// Root of the mirrored output tree; created if absent.
    pub output_dir: PathBuf,
    /// Lowercase target format token without a leading dot.
    pub target_format: String,
}

impl ConversionRequest {
    /// Creates a request, normalizing the target token.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target_format: &str,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            target_format: target_format.trim().trim_start_matches('.').to_lowercase(),
        }
    }
}

/// A discovered file together with its resolved output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    /// Discovered source file.
    pub source: PathBuf,
    /// Collision-free output path.
    pub output: PathBuf,
    /// Position of the file in discovery order.
    pub sequence_index: usize,
}

/// Result of a single task.
#[derive(Debug)]
pub enum ConversionOutcome {
    Success { source: PathBuf, output: PathBuf },
    Failure { source: PathBuf, cause: TaskError },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Progress as of one task completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub done: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn new(done: usize, total: usize) -> Self {
        Self { done, total }
    }

    /// Completion as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }
}

/// Summary returned by a completed `convert` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Files discovered.
    pub total: usize,
    /// Files converted.
    pub succeeded: usize,
    /// Files that failed.
    pub failed: usize,
    /// Wall time of the whole call in milliseconds.
    pub duration_ms: u64,
}

impl BatchReport {
    /// Whether every discovered file was converted.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_target() {
        let request = ConversionRequest::new("/in", "/out", " .MP3");
        assert_eq!(request.target_format, "mp3");
        assert_eq!(request.input_path, PathBuf::from("/in"));
    }

    #[test]
    fn test_progress_snapshot() {
        let snapshot = ProgressSnapshot::new(1, 4);
        assert_eq!(snapshot.fraction(), 0.25);
        assert!(!snapshot.is_complete());
        assert!(ProgressSnapshot::new(4, 4).is_complete());
        assert_eq!(ProgressSnapshot::new(0, 0).fraction(), 0.0);
    }

    #[test]
    fn test_outcome_is_success() {
        let ok = ConversionOutcome::Success {
            source: PathBuf::from("a.wav"),
            output: PathBuf::from("a.mp3"),
        };
        let failed = ConversionOutcome::Failure {
            source: PathBuf::from("b.wav"),
            cause: TaskError::Panicked("boom".to_string()),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }

    #[test]
    fn test_batch_report_all_succeeded() {
        let report = BatchReport {
            total: 2,
            succeeded: 2,
            failed: 0,
            duration_ms: 10,
        };
        assert!(report.all_succeeded());
        let report = BatchReport {
            failed: 1,
            succeeded: 1,
            ..report
        };
        assert!(!report.all_succeeded());
    }
}
