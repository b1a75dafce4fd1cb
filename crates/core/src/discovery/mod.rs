//! Discovery of eligible media files under an input path.

mod error;

pub use error::DiscoveryError;

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::media::MediaFilter;

/// Walks an input file or directory tree and collects files matching a [`MediaFilter`].
#[derive(Debug, Clone, Default)]
pub struct MediaFileDiscoverer {
    filter: MediaFilter,
}

impl MediaFileDiscoverer {
    /// Creates a discoverer using the given predicate.
    pub fn new(filter: MediaFilter) -> Self {
        Self { filter }
    }

    /// Returns the predicate in use.
    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }

    /// Collects eligible files under `input`.
    ///
    /// A regular file yields itself if it matches, or nothing. A directory is
    /// walked iteratively without following symlinks; results are ordered by
    /// file name within each directory. Unreadable entries below the root are
    /// skipped with a warning.
    pub fn collect(&self, input: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        let metadata = std::fs::metadata(input).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                DiscoveryError::NotFound {
                    path: input.to_path_buf(),
                }
            } else {
                DiscoveryError::io(input, e)
            }
        })?;

        if metadata.is_file() {
            return Ok(if self.filter.matches(input) {
                vec![input.to_path_buf()]
            } else {
                debug!("Input {:?} is not an eligible media file", input);
                Vec::new()
            });
        }

        if !metadata.is_dir() {
            return Ok(Vec::new());
        }

        info!("Scanning directory: {:?}", input);
        let mut files = Vec::new();

        for entry in WalkDir::new(input)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("directory walk failed"));
                    return Err(DiscoveryError::io(input, source));
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", input, e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.filter.matches(entry.path()) {
                debug!("Found media file: {:?}", entry.path());
                files.push(entry.into_path());
            }
        }

        info!("Found {} media files under {:?}", files.len(), input);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"data").unwrap();
        path
    }

    fn audio() -> MediaFileDiscoverer {
        MediaFileDiscoverer::new(MediaFilter::for_kind(MediaKind::Audio))
    }

    #[test]
    fn test_collect_missing_path() {
        let dir = TempDir::new().unwrap();
        let result = audio().collect(&dir.path().join("nope"));
        assert!(matches!(result, Err(DiscoveryError::NotFound { .. })));
    }

    #[test]
    fn test_collect_single_matching_file() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "a.wav");
        assert_eq!(audio().collect(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_collect_single_non_media_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "notes.txt");
        assert!(audio().collect(&file).unwrap().is_empty());
    }

    #[test]
    fn test_collect_recursive_sorted() {
        let dir = TempDir::new().unwrap();
        let b = touch(dir.path(), "sub/b.aac");
        let a = touch(dir.path(), "a.wav");
        let c = touch(dir.path(), "sub/deeper/c.FLAC");
        touch(dir.path(), "sub/cover.jpg");
        touch(dir.path(), "readme");

        let files = audio().collect(dir.path()).unwrap();
        assert_eq!(files, vec![a, b, c]);
    }

    #[test]
    fn test_collect_empty_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();
        assert!(audio().collect(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_collect_skips_directories_with_media_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("album.mp3")).unwrap();
        let inner = touch(dir.path(), "album.mp3/inner.ogg");
        assert_eq!(audio().collect(dir.path()).unwrap(), vec![inner]);
    }
}
