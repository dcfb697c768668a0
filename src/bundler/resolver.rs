//! Import path resolution.
//!
//! A raw import path is turned into a file on disk by trying, in order:
//!
//! 1. `<importing dir>/<raw><suffix>`
//! 2. `<importing dir>/<raw parent>/_<raw file><suffix>` (partial convention)
//! 3. the same two candidates under each configured include path
//!
//! The suffix is only appended when the raw path does not already end with
//! it. When nothing exists the result is not-found and keeps candidate 1 for
//! diagnostics. File system errors count as non-existence.

use crate::constants::PARTIAL_PREFIX;
use crate::utils::fs::normalize_path;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Outcome of resolving one import directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub found: bool,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    suffix: String,
    include_paths: Vec<PathBuf>,
}

impl Resolver {
    #[must_use]
    pub fn new(suffix: impl Into<String>, include_paths: Vec<PathBuf>) -> Self {
        Self {
            suffix: suffix.into(),
            include_paths,
        }
    }

    /// Resolves `raw` as written in a file that lives in `importing_dir`.
    pub async fn resolve(&self, raw: &str, importing_dir: &Path) -> Resolved {
        let relative = self.with_suffix(raw);
        let candidate = normalize_path(&importing_dir.join(&relative));

        if let Some(found) = first_existing(&candidate).await {
            return Resolved {
                path: found,
                found: true,
            };
        }

        for include in &self.include_paths {
            let included = normalize_path(&include.join(&relative));
            if let Some(found) = first_existing(&included).await {
                trace!("Resolved '{}' through include path {}", raw, include.display());
                return Resolved {
                    path: found,
                    found: true,
                };
            }
        }

        Resolved {
            path: candidate,
            found: false,
        }
    }

    fn with_suffix(&self, raw: &str) -> String {
        if raw.ends_with(&self.suffix) {
            raw.to_string()
        } else {
            format!("{raw}{}", self.suffix)
        }
    }
}

/// `path` itself, else its partial sibling, whichever is a regular file.
async fn first_existing(path: &Path) -> Option<PathBuf> {
    if is_file(path).await {
        return Some(path.to_path_buf());
    }

    let partial = partial_path(path)?;
    if is_file(&partial).await {
        return Some(partial);
    }

    None
}

fn partial_path(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_string_lossy();
    Some(path.with_file_name(format!("{PARTIAL_PREFIX}{file_name}")))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
