//! Progress listener trait.

use std::path::Path;

use super::error::TaskError;

/// Receives progress callbacks for one `convert` call.
///
/// `on_start` fires once before any per-file callback. Per-file callbacks may
/// arrive concurrently from different tasks and in any order; each carries the
/// `(done, total)` pair as of its own completion. Every method defaults to a
/// no-op.
///
/// A panicking callback is logged and never aborts the batch; the file it
/// reported on stays counted.
pub trait ConversionListener: Send + Sync {
    /// Called once with the number of files that will be processed.
    fn on_start(&self, _total: usize) {}

    /// Called after a file was converted.
    fn on_file_done(&self, _input: &Path, _output: &Path, _done: usize, _total: usize) {}

    /// Called after a file failed to convert.
    fn on_error(&self, _input: &Path, _cause: &TaskError, _done: usize, _total: usize) {}
}

/// Listener that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ConversionListener for NoopListener {}
