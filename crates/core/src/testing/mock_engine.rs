//! Mock transcode engine for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::engine::{TranscodeEngine, TranscodeError, TranscodeMode, TranscodeReport};
use crate::paths;

/// A recorded transcode call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// Input file.
    pub input: PathBuf,
    /// Requested output file.
    pub output: PathBuf,
    /// Requested target format.
    pub target_format: String,
    /// Whether the call succeeded.
    pub success: bool,
}

/// Mock implementation of the TranscodeEngine trait.
///
/// Provides controllable behavior for testing:
/// - Track transcode calls for assertions
/// - Fail or panic on specific inputs
/// - Reject inputs whose bytes lack a media signature
/// - Simulate latency and observe peak concurrency
///
/// Successful calls write `"<target>:"` followed by the input bytes, through a
/// staging file like a real engine.
///
/// # Example
///
/// ```rust,ignore
/// use opsify_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.set_signature(b"RIFF").await;
/// engine.fail_on("/in/broken.wav", "corrupt header").await;
///
/// let orchestrator = ConversionOrchestrator::new(config, engine.clone(), filter);
/// orchestrator.convert("/in", "/out", "mp3", None).await?;
///
/// assert_eq!(engine.transcode_count().await, 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// Inputs that fail with the given reason.
    failures: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Inputs that make the engine panic.
    panics: Arc<RwLock<HashSet<PathBuf>>>,
    /// Leading bytes every valid input must carry.
    signature: Arc<RwLock<Option<Vec<u8>>>>,
    /// Simulated transcode duration.
    delay: Arc<RwLock<Duration>>,
    /// Calls currently in flight.
    active: Arc<AtomicUsize>,
    /// Highest number of calls observed in flight at once.
    peak_active: Arc<AtomicUsize>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter when a call ends, however it ends.
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockEngine {
    /// Create a new mock engine that accepts every input.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            panics: Arc::new(RwLock::new(HashSet::new())),
            signature: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            active: Arc::new(AtomicUsize::new(0)),
            peak_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded transcode calls.
    pub async fn recorded_transcodes(&self) -> Vec<RecordedTranscode> {
        self.calls.read().await.clone()
    }

    /// Get the number of transcode calls made.
    pub async fn transcode_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Make transcoding `input` fail with `reason`.
    pub async fn fail_on(&self, input: impl AsRef<Path>, reason: impl Into<String>) {
        self.failures
            .write()
            .await
            .insert(input.as_ref().to_path_buf(), reason.into());
    }

    /// Make transcoding `input` panic.
    pub async fn panic_on(&self, input: impl AsRef<Path>) {
        self.panics
            .write()
            .await
            .insert(input.as_ref().to_path_buf());
    }

    /// Require inputs to start with `signature`; others fail as having no media stream.
    pub async fn set_signature(&self, signature: &[u8]) {
        *self.signature.write().await = Some(signature.to_vec());
    }

    /// Set the simulated transcode duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Highest number of concurrent transcode calls seen so far.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    async fn record(&self, input: &Path, output: &Path, target_format: &str, success: bool) {
        self.calls.write().await.push(RecordedTranscode {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            target_format: target_format.to_string(),
            success,
        });
    }

    async fn run(
        &self,
        input: &Path,
        output: &Path,
        target_format: &str,
    ) -> Result<TranscodeReport, TranscodeError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let should_panic = self.panics.read().await.contains(input);
        if should_panic {
            panic!("mock engine asked to panic on {}", input.display());
        }

        let bytes = tokio::fs::read(input).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TranscodeError::InputNotFound {
                    path: input.to_path_buf(),
                }
            } else {
                TranscodeError::Io(e)
            }
        })?;

        if let Some(reason) = self.failures.read().await.get(input) {
            return Err(TranscodeError::transcode_failed(reason.clone(), None));
        }

        if let Some(signature) = self.signature.read().await.as_ref() {
            if !bytes.starts_with(signature) {
                return Err(TranscodeError::no_media_stream(
                    input,
                    "missing media signature",
                ));
            }
        }

        let mode = if paths::extension(input) == target_format {
            TranscodeMode::Copied
        } else {
            TranscodeMode::Reencoded
        };

        let header = format!("{}:", target_format).into_bytes();
        let output_size_bytes = (header.len() + bytes.len()) as u64;

        // Written in two steps so concurrent writers can interleave like real encoders
        let staging = paths::partial_path(output);
        let mut file = tokio::fs::File::create(&staging).await?;
        file.write_all(&header).await?;
        file.flush().await?;
        tokio::task::yield_now().await;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&staging, output).await?;

        Ok(TranscodeReport {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            target_format: target_format.to_string(),
            mode,
            output_size_bytes,
            duration_ms: delay.as_millis() as u64,
        })
    }
}

#[async_trait]
impl TranscodeEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        target_format: &str,
    ) -> Result<TranscodeReport, TranscodeError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(Arc::clone(&self.active));
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);

        let result = self.run(input, output, target_format).await;
        self.record(input, output, target_format, result.is_ok())
            .await;
        result
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}
