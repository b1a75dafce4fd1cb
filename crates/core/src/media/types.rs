//! Types for the media module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::paths;

/// Broad category of media a batch works on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Audio-only files.
    #[default]
    Audio,
    /// Video files (with or without audio tracks).
    Video,
}

impl MediaKind {
    /// Returns the default eligible extensions for this kind (lowercase, no dot).
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Audio => &[
                "wav", "mp3", "aac", "ogg", "flac", "m4a", "wma", "aiff", "aif", "alac", "opus",
                "oga", "mka", "m4b", "amr",
            ],
            Self::Video => &[
                "mp4", "mkv", "avi", "mov", "wmv", "webm", "m4v", "ts", "m2ts", "mpg", "mpeg",
                "flv",
            ],
        }
    }

    /// FFmpeg stream selector letter (`a` or `v`).
    pub fn stream_selector(&self) -> &'static str {
        match self {
            Self::Audio => "a",
            Self::Video => "v",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Case-insensitive extension set deciding which files are eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    extensions: BTreeSet<String>,
}

impl MediaFilter {
    /// Creates a filter accepting the default extensions of `kind`.
    pub fn for_kind(kind: MediaKind) -> Self {
        Self::from_extensions(kind.default_extensions().iter().copied())
    }

    /// Creates a filter from an explicit extension list.
    ///
    /// Entries are lowercased and a leading `.` is stripped; blank entries are ignored.
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_token(e.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Adds more extensions to the filter.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions
            .extend(extra.into_iter().filter_map(|e| normalize_token(e.as_ref())));
        self
    }

    /// Whether `path` has an eligible extension.
    pub fn matches(&self, path: &Path) -> bool {
        paths::is_media_file(path, &self.extensions)
    }

    /// The normalized extension set.
    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::for_kind(MediaKind::default())
    }
}

fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim().trim_start_matches('.').to_lowercase();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Output format a batch converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    Mp3,
    Wav,
    Ogg,
    Oga,
    Opus,
    Flac,
    M4a,
    Aac,
    Aiff,
    Mka,
    Mp4,
    Mkv,
    Webm,
    Mov,
}

impl TargetFormat {
    /// Parses a format token such as `"mp3"` or `".FLAC"`.
    ///
    /// Returns `None` for tokens with no known encoder mapping.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = normalize_token(token)?;
        let format = match token.as_str() {
            "mp3" => Self::Mp3,
            "wav" => Self::Wav,
            "ogg" => Self::Ogg,
            "oga" => Self::Oga,
            "opus" => Self::Opus,
            "flac" => Self::Flac,
            "m4a" => Self::M4a,
            "aac" => Self::Aac,
            "aiff" | "aif" => Self::Aiff,
            "mka" => Self::Mka,
            "mp4" => Self::Mp4,
            "mkv" => Self::Mkv,
            "webm" => Self::Webm,
            "mov" => Self::Mov,
            _ => return None,
        };
        Some(format)
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Oga => "oga",
            Self::Opus => "opus",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Aac => "aac",
            Self::Aiff => "aiff",
            Self::Mka => "mka",
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Webm => "webm",
            Self::Mov => "mov",
        }
    }

    /// Returns the ffmpeg muxer name, passed with `-f` since staging files
    /// do not carry the final extension.
    pub fn muxer(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg | Self::Oga => "ogg",
            Self::Opus => "opus",
            Self::Flac => "flac",
            Self::M4a => "ipod",
            Self::Aac => "adts",
            Self::Aiff => "aiff",
            Self::Mka | Self::Mkv => "matroska",
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mov => "mov",
        }
    }

    /// Returns the ffmpeg audio codec for this format.
    pub fn audio_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Wav => "pcm_s16le",
            Self::Ogg | Self::Oga => "libvorbis",
            Self::Opus | Self::Webm => "libopus",
            Self::Flac => "flac",
            Self::M4a | Self::Aac | Self::Mp4 | Self::Mov | Self::Mkv => "aac",
            Self::Aiff => "pcm_s16be",
            Self::Mka => "libvorbis",
        }
    }

    /// Returns the ffmpeg video codec, `None` for audio-only formats.
    pub fn video_codec(&self) -> Option<&'static str> {
        match self {
            Self::Mp4 | Self::Mkv | Self::Mov => Some("libx264"),
            Self::Webm => Some("libvpx-vp9"),
            _ => None,
        }
    }

    /// Which kind of media this format carries.
    pub fn kind(&self) -> MediaKind {
        if self.video_codec().is_some() {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }

    /// Whether this format is lossless (bitrate settings do not apply).
    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Wav | Self::Flac | Self::Aiff)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unsupported target format: {}", s))
    }
}
