//! Transcode engine module.
//!
//! The [`TranscodeEngine`] trait is the narrow contract the batch orchestrator
//! calls for each file: given an input, an output and a target format token,
//! either leave a complete file at the output or fail without leaving one.
//!
//! [`FfmpegEngine`] implements it on top of the `ffmpeg`/`ffprobe` binaries.
//! When the input already has the target extension, the engine probes a few
//! leading frames and copies bytes instead of re-encoding.
//!
//! # Example
//!
//! ```ignore
//! use opsify_core::engine::{EngineConfig, FfmpegEngine, TranscodeEngine};
//!
//! let engine = FfmpegEngine::new(EngineConfig::default());
//! engine.validate().await?;
//!
//! let report = engine
//!     .transcode(Path::new("in/track.wav"), Path::new("out/track.mp3"), "mp3")
//!     .await?;
//! println!("{} bytes in {} ms", report.output_size_bytes, report.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EngineConfig;
pub use error::TranscodeError;
pub use ffmpeg::FfmpegEngine;
pub use traits::TranscodeEngine;
pub use types::{TranscodeMode, TranscodeReport};
