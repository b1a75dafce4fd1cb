//! FFmpeg-based engine implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::EngineConfig;
use super::error::TranscodeError;
use super::traits::TranscodeEngine;
use super::types::{TranscodeMode, TranscodeReport};
use crate::media::{MediaKind, TargetFormat};
use crate::paths;

/// Captured result of one external tool run.
struct ToolOutput {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

/// FFmpeg-based engine implementation.
pub struct FfmpegEngine {
    config: EngineConfig,
}

impl FfmpegEngine {
    /// Creates a new FFmpeg engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for a re-encode into `staging`.
    fn build_transcode_args(&self, input: &Path, staging: &Path, format: TargetFormat) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Staging file may be left over from a crash
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ];

        match format.video_codec() {
            Some(video_codec) => {
                args.extend(["-c:v".to_string(), video_codec.to_string()]);
            }
            None => {
                // Audio targets drop embedded cover art and other video streams
                args.push("-vn".to_string());
            }
        }

        args.extend(["-c:a".to_string(), format.audio_codec().to_string()]);

        if !format.is_lossless() {
            args.extend([
                "-b:a".to_string(),
                format!("{}k", self.config.audio_bitrate_kbps),
            ]);
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // The staging name has no usable extension, so the muxer is explicit
        args.extend(["-f".to_string(), format.muxer().to_string()]);
        args.push(staging.to_string_lossy().to_string());

        args
    }

    /// Builds ffprobe arguments that decode the first packets of one stream.
    fn build_probe_args(&self, input: &Path, kind: MediaKind) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            format!("{}:0", kind.stream_selector()),
            "-read_intervals".to_string(),
            format!("%+#{}", self.config.probe_frames),
            "-count_frames".to_string(),
            "-show_entries".to_string(),
            "stream=nb_read_frames".to_string(),
            "-of".to_string(),
            "csv=p=0".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    /// Parses the frame count printed by the probe command.
    fn parse_frame_count(stdout: &str) -> Option<u64> {
        stdout
            .split(|c: char| !c.is_ascii_digit())
            .find(|token| !token.is_empty())
            .and_then(|token| token.parse().ok())
    }

    /// Stream kind to probe for a same-format input.
    fn probe_kind(target_format: &str) -> MediaKind {
        match TargetFormat::from_token(target_format) {
            Some(format) => format.kind(),
            None if MediaKind::Video
                .default_extensions()
                .iter()
                .any(|ext| *ext == target_format) =>
            {
                MediaKind::Video
            }
            None => MediaKind::Audio,
        }
    }

    /// Runs an external tool with the configured timeout.
    ///
    /// The child is killed if the timeout fires or the future is dropped.
    async fn run_tool(&self, program: &Path, args: &[String]) -> Result<ToolOutput, TranscodeError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::ToolNotFound {
                        path: program.to_path_buf(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(TranscodeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Checks that `input` decodes at least one frame within the probe budget.
    async fn probe_stream(&self, input: &Path, kind: MediaKind) -> Result<(), TranscodeError> {
        let args = self.build_probe_args(input, kind);
        let output = self.run_tool(&self.config.ffprobe_path, &args).await?;

        if !output.success {
            return Err(TranscodeError::no_media_stream(
                input,
                format!("probe exited with code {:?}: {}", output.code, output.stderr),
            ));
        }

        match Self::parse_frame_count(&output.stdout) {
            Some(frames) if frames > 0 => {
                debug!("Probed {} {} frames in {:?}", frames, kind, input);
                Ok(())
            }
            _ => Err(TranscodeError::no_media_stream(
                input,
                format!("no {} frames within the first {} packets", kind, self.config.probe_frames),
            )),
        }
    }

    /// Produces the output at `staging`, returning how it was produced.
    async fn produce(
        &self,
        input: &Path,
        staging: &Path,
        target_format: &str,
    ) -> Result<TranscodeMode, TranscodeError> {
        if paths::extension(input) == target_format {
            self.probe_stream(input, Self::probe_kind(target_format)).await?;
            tokio::fs::copy(input, staging).await?;
            return Ok(TranscodeMode::Copied);
        }

        let format =
            TargetFormat::from_token(target_format).ok_or_else(|| TranscodeError::UnsupportedTarget {
                format: target_format.to_string(),
            })?;

        let args = self.build_transcode_args(input, staging, format);
        debug!("Transcoding {:?} -> {:?} ({})", input, staging, format);
        let output = self.run_tool(&self.config.ffmpeg_path, &args).await?;

        if !output.success {
            return Err(TranscodeError::transcode_failed(
                format!("FFmpeg exited with code: {:?}", output.code),
                if output.stderr.is_empty() {
                    None
                } else {
                    Some(output.stderr)
                },
            ));
        }

        Ok(TranscodeMode::Reencoded)
    }
}

/// Removes a staging file; failures are logged and never replace the primary outcome.
async fn discard_staging(staging: &Path) {
    match tokio::fs::remove_file(staging).await {
        Ok(()) => debug!("Removed staging file {:?}", staging),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove staging file {:?}: {}", staging, e),
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        target_format: &str,
    ) -> Result<TranscodeReport, TranscodeError> {
        let start = Instant::now();

        if !input.is_file() {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let target_format = target_format.trim_start_matches('.').to_lowercase();
        let staging: PathBuf = paths::partial_path(output);

        let mode = match self.produce(input, &staging, &target_format).await {
            Ok(mode) => mode,
            Err(e) => {
                discard_staging(&staging).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&staging, output).await {
            discard_staging(&staging).await;
            return Err(TranscodeError::Io(e));
        }

        let output_size_bytes = tokio::fs::metadata(output).await?.len();

        Ok(TranscodeReport {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            target_format,
            mode,
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        for program in [&self.config.ffmpeg_path, &self.config.ffprobe_path] {
            let output = self.run_tool(program, &["-version".to_string()]).await?;
            if !output.success {
                return Err(TranscodeError::transcode_failed(
                    format!("{} -version exited with code: {:?}", program.display(), output.code),
                    Some(output.stderr),
                ));
            }
        }
        Ok(())
    }
}
