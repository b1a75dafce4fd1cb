//! Configuration for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Timeout for a single file in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Number of leading packets read when validating a same-format input.
    #[serde(default = "default_probe_frames")]
    pub probe_frames: u32,

    /// Audio bitrate for lossy targets, in kbps.
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional ffmpeg arguments placed before the output.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_probe_frames() -> u32 {
    5
}

fn default_audio_bitrate() -> u32 {
    192
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_timeout(),
            probe_frames: default_probe_frames(),
            audio_bitrate_kbps: default_audio_bitrate(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the probe budget for same-format inputs.
    pub fn with_probe_frames(mut self, frames: u32) -> Self {
        self.probe_frames = frames;
        self
    }

    /// Sets the lossy audio bitrate.
    pub fn with_audio_bitrate(mut self, kbps: u32) -> Self {
        self.audio_bitrate_kbps = kbps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.timeout_secs, 3600);
        assert_eq!(config.probe_frames, 5);
        assert_eq!(config.audio_bitrate_kbps, 192);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::with_paths(
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffprobe"),
        )
        .with_timeout(60)
        .with_probe_frames(10)
        .with_audio_bitrate(320);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.probe_frames, 10);
        assert_eq!(config.audio_bitrate_kbps, 320);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EngineConfig = toml::from_str("timeout_secs = 30").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.probe_frames, 5);
        assert_eq!(config.ffmpeg_log_level, "error");
    }
}
