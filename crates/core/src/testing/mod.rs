//! Testing utilities and mock implementations.
//!
//! Lets the orchestrator run end to end without an ffmpeg install.
//!
//! # Example
//!
//! ```rust,ignore
//! use opsify_core::testing::{fixtures, MockEngine, RecordingListener};
//!
//! let engine = MockEngine::new();
//! engine.set_signature(fixtures::WAV_SIGNATURE).await;
//!
//! let listener = Arc::new(RecordingListener::new());
//! orchestrator.convert(input, output, "mp3", Some(listener.clone())).await?;
//! assert!(listener.errors().is_empty());
//! ```

mod mock_engine;
mod recording_listener;

pub use mock_engine::{MockEngine, RecordedTranscode};
pub use recording_listener::{ListenerEvent, RecordingListener};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Leading bytes of a RIFF/WAVE file.
    pub const WAV_SIGNATURE: &[u8] = b"RIFF";

    /// Create a fake media file (with a RIFF header) at `root/rel`, creating parents.
    pub fn media_file(root: &Path, rel: &str) -> PathBuf {
        let mut content = WAV_SIGNATURE.to_vec();
        content.extend_from_slice(rel.as_bytes());
        write_file(root, rel, &content)
    }

    /// Create a file with arbitrary bytes at `root/rel`, creating parents.
    ///
    /// Panics on I/O failure; intended for tests only.
    pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture parent");
        }
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    /// Staging files (`*.part`) left directly in `dir`.
    pub fn staging_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .expect("read fixture dir")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "part"))
            .collect()
    }
}
