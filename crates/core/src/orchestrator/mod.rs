//! Batch conversion orchestrator.
//!
//! [`ConversionOrchestrator`] turns one input path into a batch of per-file
//! transcodes:
//! - Discovery and output-root creation run first; failures there are fatal.
//! - Each discovered file becomes one task, run concurrently up to the
//!   configured parallelism.
//! - Per-file failures are reported to the [`ConversionListener`] and never
//!   abort sibling tasks or the call itself.
//!
//! # Example
//!
//! ```ignore
//! use opsify_core::{ConversionOrchestrator, FfmpegEngine, MediaFilter, MediaKind};
//!
//! let orchestrator = ConversionOrchestrator::new(
//!     OrchestratorConfig::default(),
//!     FfmpegEngine::with_defaults(),
//!     MediaFilter::for_kind(MediaKind::Audio),
//! );
//!
//! let report = orchestrator.convert("music/", "converted/", "mp3", None).await?;
//! println!("{} of {} failed", report.failed, report.total);
//! ```

mod config;
mod error;
mod listener;
mod runner;
mod types;

pub use config::{NamingPolicy, OrchestratorConfig};
pub use error::{ConvertError, TaskError};
pub use listener::{ConversionListener, NoopListener};
pub use runner::ConversionOrchestrator;
pub use types::{
    BatchReport, ConversionOutcome, ConversionRequest, ConversionTask, ProgressSnapshot,
};
