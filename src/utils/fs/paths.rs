//! Path manipulation helpers.
//!
//! Import targets, entry files and dedupe-glob matches are all compared as
//! plain absolute paths, so every path that enters the bundler goes through
//! [`absolutize`] first. Normalisation is purely lexical: symlinks are not
//! resolved, so two different spellings of the same file through a symlink are
//! treated as two files.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components lexically.
///
/// A `..` at the root of an absolute path is dropped (`/..` is `/`), while a
/// leading `..` in a relative path is kept.
///
/// # Examples
///
/// ```rust
/// use scss_bundler::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// assert_eq!(normalize_path(Path::new("../src/./lib.scss")), PathBuf::from("../src/lib.scss"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Joins `path` onto `base` (unless already absolute) and normalizes the result.
#[must_use]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Returns the process working directory as a normalized absolute path.
pub fn current_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| anyhow::anyhow!("Failed to determine current directory: {e}"))?;
    Ok(normalize_path(&cwd))
}

/// Walks up from `start` looking for a file called `file_name`.
///
/// Returns the full path of the first match, or `None` when the file system
/// root is reached.
#[must_use]
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}
