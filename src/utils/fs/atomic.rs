//! Atomic file writes.
//!
//! Bundles are written to a temporary file in the destination directory and
//! then renamed into place, so a concurrent reader (a dev server watching the
//! output, for example) never sees a half-written stylesheet.

use crate::core::file_error::{FileOperation, FileOperationError, FileResultExt};
use std::io::Write;
use std::path::Path;

/// Atomically writes `content` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns a [`FileOperationError`] naming the step that failed: creating the
/// parent directory, writing the temporary file, or renaming it into place.
///
/// # Examples
///
/// ```rust,no_run
/// use scss_bundler::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("dist/main.scss"), b".button { color: red; }")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FileOperationError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent).with_file_context(
        FileOperation::CreateDir,
        parent,
        "creating output directory",
        "atomic_write",
    )?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).with_file_context(
        FileOperation::Write,
        parent,
        "creating temporary output file",
        "atomic_write",
    )?;

    temp.write_all(content)
        .and_then(|()| temp.as_file().sync_all())
        .with_file_context(FileOperation::Write, temp.path(), "writing bundle", "atomic_write")?;

    temp.persist(path).map_err(|e| e.error).with_file_context(
        FileOperation::Persist,
        path,
        "moving bundle into place",
        "atomic_write",
    )?;

    Ok(())
}
