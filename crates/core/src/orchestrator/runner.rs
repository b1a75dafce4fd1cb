//! Batch conversion runner.
//!
//! Discovery runs to completion before any file is dispatched. Tasks then run
//! on a `JoinSet`, gated by a semaphore, and share only the done-counter and
//! the listener.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::discovery::{DiscoveryError, MediaFileDiscoverer};
use crate::engine::TranscodeEngine;
use crate::media::MediaFilter;
use crate::paths;

use super::config::{NamingPolicy, OrchestratorConfig};
use super::error::{ConvertError, TaskError};
use super::listener::ConversionListener;
use super::types::{
    BatchReport, ConversionOutcome, ConversionRequest, ConversionTask, ProgressSnapshot,
};

/// Counters shared by every task of one batch.
struct BatchCounters {
    total: usize,
    done: AtomicUsize,
    succeeded: AtomicUsize,
}

impl BatchCounters {
    fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
        }
    }

    /// Counts one finished task and returns the progress as of that moment.
    fn complete(&self, success: bool) -> ProgressSnapshot {
        if success {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        ProgressSnapshot::new(done, self.total)
    }
}

/// Coordinates discovery, output naming and concurrent transcoding of a batch.
pub struct ConversionOrchestrator<E: TranscodeEngine> {
    config: OrchestratorConfig,
    engine: Arc<E>,
    discoverer: MediaFileDiscoverer,
}

impl<E: TranscodeEngine + 'static> ConversionOrchestrator<E> {
    /// Creates a new orchestrator.
    pub fn new(config: OrchestratorConfig, engine: E, filter: MediaFilter) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            discoverer: MediaFileDiscoverer::new(filter),
        }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Converts every eligible file under `input` into `output_dir`.
    ///
    /// Returns once every discovered file has been reported to the listener.
    /// Only batch-level problems are returned as errors; a report with
    /// failures is still `Ok`.
    pub async fn convert(
        &self,
        input: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        target_format: &str,
        listener: Option<Arc<dyn ConversionListener>>,
    ) -> Result<BatchReport, ConvertError> {
        let request = ConversionRequest::new(
            input.as_ref(),
            output_dir.as_ref(),
            target_format,
        );
        self.convert_request(request, listener).await
    }

    /// Runs a prepared [`ConversionRequest`].
    pub async fn convert_request(
        &self,
        request: ConversionRequest,
        listener: Option<Arc<dyn ConversionListener>>,
    ) -> Result<BatchReport, ConvertError> {
        let start = Instant::now();
        info!(
            "Starting conversion: input={:?}, output_dir={:?}, target={}",
            request.input_path, request.output_dir, request.target_format
        );

        if !request.input_path.exists() {
            return Err(ConvertError::InputNotFound {
                path: request.input_path.clone(),
            });
        }

        paths::ensure_dir(&request.output_dir)
            .await
            .map_err(|source| ConvertError::OutputDirFailed {
                path: request.output_dir.clone(),
                source,
            })?;

        let files = self.discover(&request.input_path).await?;
        if files.is_empty() {
            return Err(ConvertError::NoMediaFiles {
                path: request.input_path.clone(),
            });
        }

        let counters = Arc::new(BatchCounters::new(files.len()));
        if let Some(ref listener) = listener {
            let total = counters.total;
            let started = std::panic::catch_unwind(AssertUnwindSafe(|| listener.on_start(total)));
            if let Err(panic) = started {
                error!(
                    "Listener panicked in on_start: {}",
                    panic_message(panic.as_ref())
                );
            }
        }

        let parallelism = self.config.effective_parallelism();
        debug!(
            "Dispatching {} files with parallelism {}",
            counters.total, parallelism
        );

        let request = Arc::new(request);
        let semaphore = Arc::new(Semaphore::new(parallelism));
        let mut tasks = JoinSet::new();

        for (sequence_index, source) in files.into_iter().enumerate() {
            let engine = Arc::clone(&self.engine);
            let request = Arc::clone(&request);
            let semaphore = Arc::clone(&semaphore);
            let counters = Arc::clone(&counters);
            let listener = listener.clone();
            let naming = self.config.naming;

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail
                let _permit = semaphore.acquire_owned().await.ok();

                let run = Self::run_task(engine, &request, naming, source.clone(), sequence_index);
                let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                    Ok(Ok(output)) => ConversionOutcome::Success { source, output },
                    Ok(Err(cause)) => ConversionOutcome::Failure { source, cause },
                    Err(panic) => ConversionOutcome::Failure {
                        source,
                        cause: TaskError::Panicked(panic_message(panic.as_ref())),
                    },
                };

                Self::report(outcome, &counters, listener.as_deref());
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                // Only a panicking listener gets here; the task was already counted
                error!("Conversion task aborted after reporting: {}", e);
            }
        }

        let done = counters.done.load(Ordering::SeqCst);
        let succeeded = counters.succeeded.load(Ordering::SeqCst);
        let progress = ProgressSnapshot::new(done, counters.total);
        if !progress.is_complete() {
            error!(
                "Only {} of {} tasks reported before the batch ended",
                progress.done, progress.total
            );
        }
        let report = BatchReport {
            total: counters.total,
            succeeded,
            failed: done - succeeded,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Finished conversion for {:?} ({} of {} done, {} failed, {} ms)",
            request.input_path, done, report.total, report.failed, report.duration_ms
        );

        Ok(report)
    }

    /// Runs discovery on the blocking pool.
    async fn discover(&self, input: &Path) -> Result<Vec<PathBuf>, ConvertError> {
        let discoverer = self.discoverer.clone();
        let input = input.to_path_buf();

        let result = tokio::task::spawn_blocking({
            let input = input.clone();
            move || discoverer.collect(&input)
        })
        .await
        .map_err(|e| {
            DiscoveryError::io(&input, std::io::Error::other(format!("discovery task failed: {}", e)))
        })?;

        Ok(result?)
    }

    /// Resolves the output for one file and runs the engine on it.
    async fn run_task(
        engine: Arc<E>,
        request: &ConversionRequest,
        naming: NamingPolicy,
        source: PathBuf,
        sequence_index: usize,
    ) -> Result<PathBuf, TaskError> {
        let desired = paths::map_to_output(
            &request.input_path,
            &source,
            &request.output_dir,
            &request.target_format,
        );

        paths::ensure_parent_dir(&desired)
            .await
            .map_err(|e| TaskError::output(&desired, e))?;

        let output = match naming {
            NamingPolicy::Probe => paths::unique(&desired),
            NamingPolicy::Exclusive => paths::unique_exclusive(&desired)
                .await
                .map_err(|e| TaskError::output(&desired, e))?,
        };

        let task = ConversionTask {
            source,
            output,
            sequence_index,
        };
        debug!(
            "Task #{}: {:?} -> {:?}",
            task.sequence_index, task.source, task.output
        );

        match engine
            .transcode(&task.source, &task.output, &request.target_format)
            .await
        {
            Ok(report) => {
                debug!(
                    "Task #{} finished ({:?}, {} bytes, {} ms)",
                    task.sequence_index, report.mode, report.output_size_bytes, report.duration_ms
                );
                Ok(task.output)
            }
            Err(e) => {
                if naming == NamingPolicy::Exclusive {
                    release_reservation(&task.output).await;
                }
                Err(e.into())
            }
        }
    }

    /// Counts a finished task and notifies the listener.
    fn report(
        outcome: ConversionOutcome,
        counters: &BatchCounters,
        listener: Option<&dyn ConversionListener>,
    ) {
        let progress = counters.complete(outcome.is_success());

        match outcome {
            ConversionOutcome::Success { source, output } => {
                info!(
                    "Converted file: {:?} -> {:?} ({}/{})",
                    source, output, progress.done, progress.total
                );
                if let Some(listener) = listener {
                    listener.on_file_done(&source, &output, progress.done, progress.total);
                }
            }
            ConversionOutcome::Failure { source, cause } => {
                warn!(
                    "Failed to convert {:?}: {} ({}/{}, retryable: {})",
                    source,
                    cause,
                    progress.done,
                    progress.total,
                    cause.is_retryable()
                );
                if let Some(listener) = listener {
                    listener.on_error(&source, &cause, progress.done, progress.total);
                }
            }
        }
    }
}

/// Removes an empty reservation left by a failed task.
async fn release_reservation(path: &Path) {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() == 0 => {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!("Failed to release output reservation {:?}: {}", path, e);
            }
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to inspect output reservation {:?}: {}", path, e),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
