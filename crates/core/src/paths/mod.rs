//! Output path mapping and collision-free naming.
//!
//! Everything here is deterministic given the state of the filesystem. The only
//! side effects are existence probes and, for [`unique_exclusive`] and the
//! `ensure_*` helpers, creating the entries they are asked for.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs::{self, OpenOptions};
use tracing::debug;

/// Returns the lowercase text after the last `.` of the file name, or `""`.
pub fn extension(path: &Path) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) => name[dot + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Whether the extension of `path` is in `extensions` (expected lowercase).
pub fn is_media_file(path: &Path, extensions: &BTreeSet<String>) -> bool {
    let ext = extension(path);
    !ext.is_empty() && extensions.contains(&ext)
}

/// Maps `input_file` found under `input_root` to its location under `output_root`.
///
/// In single-file mode (`input_file` is `input_root`) the output is the file's
/// base name with `new_extension` placed directly in `output_root`. Otherwise the
/// path relative to `input_root` is kept and only the leaf extension changes.
pub fn map_to_output(
    input_root: &Path,
    input_file: &Path,
    output_root: &Path,
    new_extension: &str,
) -> PathBuf {
    let root = absolute(input_root);
    let file = absolute(input_file);

    let relative = match file.strip_prefix(&root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        // Single-file mode, or a file that is not under the root at all.
        _ => PathBuf::from(file_name(&file)),
    };

    let leaf = with_extension(&file_name(&relative), new_extension);
    match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => output_root.join(parent).join(leaf),
        _ => output_root.join(leaf),
    }
}

/// Returns `desired` if nothing exists there, otherwise the first free
/// `"name (n).ext"` sibling with `n` counting from 1.
///
/// This is check-then-use: two concurrent callers may be handed the same
/// name. Use [`unique_exclusive`] when that matters.
pub fn unique(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let mut n = 1u32;
    loop {
        let candidate = numbered(desired, n);
        if !candidate.exists() {
            debug!("Output {:?} taken, using {:?}", desired, candidate);
            return candidate;
        }
        n += 1;
    }
}

/// Like [`unique`], but reserves the returned name by creating it exclusively.
///
/// The reservation is an empty file. The caller owns it and must either
/// replace it with the finished output or remove it.
pub async fn unique_exclusive(desired: &Path) -> io::Result<PathBuf> {
    let mut n = 0u32;
    loop {
        let candidate = if n == 0 {
            desired.to_path_buf()
        } else {
            numbered(desired, n)
        };

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(_) => {
                if n > 0 {
                    debug!("Output {:?} taken, reserved {:?}", desired, candidate);
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Counter that keeps staging names distinct within this process.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fresh sibling staging path for `output`: `dir/.name.ext.<pid>-<n>.part`.
///
/// Every call returns a new name, so two writers aiming at the same output
/// never share a staging file.
pub fn partial_path(output: &Path) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let staged = format!(
        ".{}.{}-{}.part",
        file_name(output),
        std::process::id(),
        seq
    );
    match output.parent() {
        Some(parent) => parent.join(staged),
        None => PathBuf::from(staged),
    }
}

/// Creates `dir` and all its parents if absent.
pub async fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir).await
}

/// Creates the parent directory of `file` if absent.
pub async fn ensure_parent_dir(file: &Path) -> io::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

fn numbered(desired: &Path, n: u32) -> PathBuf {
    let name = file_name(desired);
    let (base, ext) = split_name(&name);
    let candidate = format!("{} ({}){}", base, n, ext);
    match desired.parent() {
        Some(parent) => parent.join(candidate),
        None => PathBuf::from(candidate),
    }
}

/// Splits `name` into base and `.ext`; a leading dot is part of the base.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

fn with_extension(name: &str, extension: &str) -> String {
    let (base, _) = split_name(name);
    format!("{}.{}", base, extension)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("song.MP3")), "mp3");
        assert_eq!(extension(Path::new("/a/b/archive.tar.GZ")), "gz");
        assert_eq!(extension(Path::new("README")), "");
        assert_eq!(extension(Path::new("dir.d/README")), "");
        assert_eq!(extension(Path::new("trailing.")), "");
    }

    #[test]
    fn test_is_media_file() {
        let set = exts(&["wav", "mp3"]);
        assert!(is_media_file(Path::new("a.wav"), &set));
        assert!(is_media_file(Path::new("a.WAV"), &set));
        assert!(!is_media_file(Path::new("a.txt"), &set));
        assert!(!is_media_file(Path::new("wav"), &set));
    }

    #[test]
    fn test_map_to_output_directory_mode() {
        let out = map_to_output(
            Path::new("/in"),
            Path::new("/in/c/d/track.wav"),
            Path::new("/out"),
            "mp3",
        );
        assert_eq!(out, PathBuf::from("/out/c/d/track.mp3"));
    }

    #[test]
    fn test_map_to_output_top_level_file() {
        let out = map_to_output(
            Path::new("/in"),
            Path::new("/in/a.wav"),
            Path::new("/out"),
            "mp3",
        );
        assert_eq!(out, PathBuf::from("/out/a.mp3"));
    }

    #[test]
    fn test_map_to_output_single_file_mode() {
        let out = map_to_output(
            Path::new("/music/live.take2.flac"),
            Path::new("/music/live.take2.flac"),
            Path::new("/out"),
            "ogg",
        );
        assert_eq!(out, PathBuf::from("/out/live.take2.ogg"));
    }

    #[test]
    fn test_map_to_output_without_extension_appends() {
        let out = map_to_output(
            Path::new("/in"),
            Path::new("/in/sub/rawtrack"),
            Path::new("/out"),
            "wav",
        );
        assert_eq!(out, PathBuf::from("/out/sub/rawtrack.wav"));
    }

    #[test]
    fn test_map_to_output_relative_paths() {
        let out = map_to_output(
            Path::new("music"),
            Path::new("music/album/01.aac"),
            Path::new("converted"),
            "mp3",
        );
        assert_eq!(out, PathBuf::from("converted/album/01.mp3"));
    }

    #[test]
    fn test_unique_returns_free_path_unchanged() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("a.mp3");
        assert_eq!(unique(&desired), desired);
        assert_eq!(unique(&desired), unique(&desired));
    }

    #[test]
    fn test_unique_inserts_counter_before_extension() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("a.mp3");
        std::fs::write(&desired, b"x").unwrap();
        assert_eq!(unique(&desired), dir.path().join("a (1).mp3"));

        std::fs::write(dir.path().join("a (1).mp3"), b"x").unwrap();
        assert_eq!(unique(&desired), dir.path().join("a (2).mp3"));
    }

    #[test]
    fn test_unique_without_extension() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("track");
        std::fs::write(&desired, b"x").unwrap();
        assert_eq!(unique(&desired), dir.path().join("track (1)"));
    }

    #[test]
    fn test_unique_never_returns_existing_path() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("a.mp3");
        for name in ["a.mp3", "a (1).mp3", "a (3).mp3"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let got = unique(&desired);
        assert!(!got.exists());
        assert_eq!(got, dir.path().join("a (2).mp3"));
    }

    #[tokio::test]
    async fn test_unique_exclusive_reserves_names() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("a.mp3");

        let first = unique_exclusive(&desired).await.unwrap();
        let second = unique_exclusive(&desired).await.unwrap();

        assert_eq!(first, desired);
        assert_eq!(second, dir.path().join("a (1).mp3"));
        assert!(first.exists());
        assert!(second.exists());
    }

    #[tokio::test]
    async fn test_unique_exclusive_missing_parent_fails() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("missing").join("a.mp3");
        assert!(unique_exclusive(&desired).await.is_err());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let staged = partial_path(Path::new("/out/sub/a.mp3"));
        assert_eq!(staged.parent(), Some(Path::new("/out/sub")));
        let name = file_name(&staged);
        assert!(name.starts_with(".a.mp3."), "unexpected name {}", name);
        assert!(name.ends_with(".part"), "unexpected name {}", name);
    }

    #[test]
    fn test_partial_path_differs_per_call() {
        let output = Path::new("/out/a.mp3");
        let first = partial_path(output);
        let second = partial_path(output);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_ensure_dirs_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("x/y/z");
        ensure_dir(&nested).await.unwrap();
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        let file = dir.path().join("p/q/file.mp3");
        ensure_parent_dir(&file).await.unwrap();
        ensure_parent_dir(&file).await.unwrap();
        assert!(dir.path().join("p/q").is_dir());
        assert!(!file.exists());
    }
}
