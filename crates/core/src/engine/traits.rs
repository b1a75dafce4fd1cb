//! Trait definitions for the engine module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscodeError;
use super::types::TranscodeReport;

/// An engine that converts one media file into a target format.
///
/// Implementations own any decoder/encoder resources for the duration of a
/// single call and release them on every exit path. On failure no file may be
/// left at `output` that looks like a finished conversion.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Converts `input` into `output` using the lowercase `target_format` token.
    ///
    /// When the input extension already equals the target, the input is
    /// validated by a bounded probe and copied instead of re-encoded.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        target_format: &str,
    ) -> Result<TranscodeReport, TranscodeError>;

    /// Validates that the engine is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}
