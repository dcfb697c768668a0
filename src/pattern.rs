//! Dedupe-glob expansion.
//!
//! A run's dedupe rules are glob patterns naming files that should be inlined
//! at most once per run. They are expanded exactly once, up front, into a
//! [`DedupSet`] of absolute normalized paths that the engine then consults
//! for every import it resolves.
//!
//! # Pattern Syntax
//!
//! Standard `glob` crate syntax, evaluated against the file system:
//!
//! - `*` matches any sequence of characters within a single path component
//! - `**` matches any sequence of path components (recursive matching)
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match a character set or range
//!
//! Relative patterns are joined onto the run's root directory, whose own
//! characters are escaped so a root such as `site [v2]` is matched literally.
//! Absolute patterns are used as-is. Only regular files are kept; directories matched
//! by a pattern contribute nothing.
//!
//! # Failure Policy
//!
//! Expansion failure is a hard error for the whole batch. A malformed pattern
//! or an unreadable directory under a pattern yields an error rather than a
//! silently smaller set, because a missing member would re-inline a file that
//! should have been deduplicated.

use crate::core::BundleError;
use crate::utils::fs::normalize_path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Absolute paths eligible for duplicate-inclusion elision.
///
/// Read-only once built, and shared by every entry of a batch.
///
/// # Examples
///
/// ```rust,no_run
/// use scss_bundler::pattern::DedupSet;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let dedup = DedupSet::expand(&["src/shared/**/*.scss"], Path::new("/project"))?;
/// if dedup.contains(Path::new("/project/src/shared/_variables.scss")) {
///     println!("variables are deduplicated");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DedupSet {
    paths: HashSet<PathBuf>,
}

impl DedupSet {
    /// An empty set: nothing is ever deduplicated.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Expands every pattern relative to `root` and collects matching files.
    ///
    /// This walks the file system synchronously; async callers should run it
    /// on a blocking thread.
    ///
    /// # Errors
    ///
    /// - [`BundleError::InvalidGlobPattern`] when a pattern does not parse
    /// - [`BundleError::GlobExpansionFailed`] when a matched path cannot be read
    pub fn expand<S: AsRef<str>>(patterns: &[S], root: &Path) -> Result<Self, BundleError> {
        let mut paths = HashSet::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let full_str = anchor_pattern(pattern, root);

            debug!("Expanding dedupe pattern '{}' as '{}'", pattern, full_str);

            let entries = glob::glob(&full_str).map_err(|e| BundleError::InvalidGlobPattern {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })?;

            let mut matched = 0usize;
            for entry in entries {
                let path = entry.map_err(|e| BundleError::GlobExpansionFailed {
                    pattern: pattern.to_string(),
                    reason: format!("{}: {}", e.path().display(), e.error()),
                })?;

                if path.is_file() {
                    trace!("Dedupe match: {}", path.display());
                    paths.insert(normalize_path(&path));
                    matched += 1;
                }
            }

            debug!("Pattern '{}' matched {} file(s)", pattern, matched);
        }

        Ok(Self {
            paths,
        })
    }

    /// Builds a set from already-absolute paths.
    #[must_use]
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        Self {
            paths: paths.into_iter().map(|p| normalize_path(&p)).collect(),
        }
    }

    /// Whether `path` (absolute, normalized) is dedup-eligible.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Joins a relative `pattern` onto `root`, escaping the root's glob
/// metacharacters.
fn anchor_pattern(pattern: &str, root: &Path) -> String {
    if Path::new(pattern).is_absolute() {
        return pattern.to_string();
    }

    let root = glob::Pattern::escape(&normalize_path(root).to_string_lossy());
    Path::new(&root).join(pattern).to_string_lossy().into_owned()
}
