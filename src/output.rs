//! Persisting bundled stylesheets.
//!
//! Each found entry is written with [`atomic_write`], so a watcher on the
//! output never sees a partial file. Entries that were not found are skipped
//! and reported back; the caller decides whether that fails the run.

use crate::bundler::BundleNode;
use crate::config::BundleConfig;
use crate::core::BundleError;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where bundled content goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One file, for a single entry.
    File(PathBuf),
    /// `<dir>/<entry file name>` for every entry.
    Directory(PathBuf),
    /// Concatenated to standard output in entry order.
    Stdout,
}

impl OutputTarget {
    #[must_use]
    pub fn from_config(config: &BundleConfig) -> Self {
        match (&config.out_file, &config.out_dir) {
            (Some(file), _) => Self::File(file.clone()),
            (None, Some(dir)) => Self::Directory(dir.clone()),
            (None, None) => Self::Stdout,
        }
    }

    /// Output path for `entry`, or `None` for standard output.
    ///
    /// # Errors
    ///
    /// Fails when `entry` has no file name to reuse in an output directory.
    pub fn destination(&self, entry: &Path) -> Result<Option<PathBuf>, BundleError> {
        match self {
            Self::File(file) => Ok(Some(file.clone())),
            Self::Directory(dir) => {
                let name = entry.file_name().ok_or_else(|| BundleError::ConfigError {
                    message: format!("Entry {} has no file name", entry.display()),
                })?;
                Ok(Some(dir.join(name)))
            }
            Self::Stdout => Ok(None),
        }
    }
}

/// What [`write_bundles`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Files written, in entry order.
    pub written: Vec<PathBuf>,
    /// Entries skipped because they were not found.
    pub missing: Vec<PathBuf>,
}

impl WriteReport {
    /// Turns skipped entries into an error naming the first of them.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::EntryNotFound`] when any entry was missing.
    pub fn ensure_complete(&self) -> Result<(), BundleError> {
        match self.missing.first() {
            Some(path) => Err(BundleError::EntryNotFound {
                path: path.display().to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Writes every found node's content to `target`.
///
/// Standard output content goes to `stdout`, which callers pass in so tests
/// can capture it. Destinations are checked before anything is written.
///
/// # Errors
///
/// Fails when two entries map to the same output file, when a destination
/// would overwrite one of the entries themselves, or when a write fails.
/// Missing entries are not an error here.
pub fn write_bundles(
    nodes: &[BundleNode],
    target: &OutputTarget,
    stdout: &mut impl Write,
) -> Result<WriteReport> {
    let mut report = WriteReport::default();
    let mut planned: Vec<(&BundleNode, Option<PathBuf>)> = Vec::with_capacity(nodes.len());

    for node in nodes {
        if !node.found {
            warn!("Skipping output for missing entry {}", node.path.display());
            report.missing.push(node.path.clone());
            continue;
        }
        planned.push((node, target.destination(&node.path)?));
    }

    check_destinations(nodes, &planned)?;

    for (node, destination) in planned {
        match destination {
            Some(destination) => {
                atomic_write(&destination, node.content_str().as_bytes())?;
                info!("Wrote {} ({} bytes)", destination.display(), node.content_str().len());
                report.written.push(destination);
            }
            None => {
                stdout
                    .write_all(node.content_str().as_bytes())
                    .and_then(|()| stdout.flush())
                    .context("Failed to write bundle to standard output")?;
            }
        }
    }

    Ok(report)
}

/// Rejects plans where two entries share an output file or an output would
/// replace an entry.
fn check_destinations(
    nodes: &[BundleNode],
    planned: &[(&BundleNode, Option<PathBuf>)],
) -> Result<(), BundleError> {
    let mut owners: HashMap<&Path, &Path> = HashMap::new();

    for (node, destination) in planned {
        let Some(destination) = destination else {
            continue;
        };

        if nodes.iter().any(|n| n.path == *destination) {
            return Err(BundleError::ConfigError {
                message: format!("Output {} would overwrite an entry file", destination.display()),
            });
        }

        if let Some(previous) = owners.insert(destination, &node.path) {
            // The same entry listed twice writes identical content.
            if previous != node.path {
                return Err(BundleError::ConfigError {
                    message: format!(
                        "Entries {} and {} would both be written to {}",
                        previous.display(),
                        node.path.display(),
                        destination.display()
                    ),
                });
            }
        }
    }

    Ok(())
}
