//! On-disk stylesheet projects for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory that stylesheets can be written into.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ProjectFixture {
    temp_dir: TempDir,
    root: PathBuf,
}

impl ProjectFixture {
    /// Creates an empty project.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp directory")?;
        // Canonical so paths compare equal to what the bundler reports on
        // platforms where the temp dir is behind a symlink.
        let root = temp_dir
            .path()
            .canonicalize()
            .context("Failed to canonicalize temp directory")?;
        Ok(Self {
            temp_dir,
            root,
        })
    }

    /// Project root (absolute).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Reads `relative` back as a string.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Whether `relative` exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// The underlying temp directory.
    pub fn temp_dir(&self) -> &TempDir {
        &self.temp_dir
    }
}
