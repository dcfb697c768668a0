//! Project configuration (`scss-bundler.toml`).
//!
//! The file is optional. When `--config` is not given it is searched for by
//! walking up from the working directory, the way `git` finds its repository.
//! Every relative path in it is resolved against the directory containing the
//! file, so a build works the same from any subdirectory.
//!
//! ```toml
//! entries = ["src/main.scss", "src/admin.scss"]
//! out_dir = "dist"
//! dedupe_globs = ["src/shared/**/*.scss"]
//! include_paths = ["node_modules"]
//! ignore_imports = ["^~"]
//! ```
//!
//! # Precedence
//!
//! Command-line values override file values. List flags replace the file's
//! list rather than extending it.

mod parser;

pub use parser::parse_config;

use crate::bundler::BundleOptions;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_SUFFIX, batch_operation_timeout, default_max_parallel};
use crate::core::BundleError;
use crate::directive::ImportFilter;
use crate::utils::fs::{absolutize, find_upwards};
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Bundling settings from `scss-bundler.toml` and/or the command line.
///
/// After [`load`](Self::load) all paths are absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Entry stylesheets, bundled in this order.
    pub entries: Vec<PathBuf>,
    /// Single output file; only valid with exactly one entry.
    pub out_file: Option<PathBuf>,
    /// Output directory; each entry keeps its file name.
    pub out_dir: Option<PathBuf>,
    /// Base for relative entries and dedupe globs. Defaults to the config
    /// file's directory, or the working directory without a config file.
    pub root_dir: Option<PathBuf>,
    /// Files inlined at most once per run.
    pub dedupe_globs: Vec<String>,
    /// Extra import search directories.
    pub include_paths: Vec<PathBuf>,
    /// Regular expressions for imports left untouched.
    pub ignore_imports: Vec<String>,
    pub suffix: Option<String>,
    pub max_parallel: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl BundleConfig {
    /// Searches `start` and its ancestors for `scss-bundler.toml`.
    #[must_use]
    pub fn find(start: &Path) -> Option<PathBuf> {
        find_upwards(start, CONFIG_FILE_NAME)
    }

    /// Loads a config file and makes its paths absolute.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!("Loaded configuration from {}", path.display());
        Ok(config.anchored_at(&base))
    }

    /// Loads `explicit` when given, else the nearest config file above `cwd`,
    /// else an empty config.
    ///
    /// # Errors
    ///
    /// Fails when the chosen file cannot be read or parsed. A missing
    /// `explicit` file is an error.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(&absolutize(path, cwd)),
            None => match Self::find(cwd) {
                Some(path) => Self::load(&path),
                None => {
                    debug!("No {} found above {}", CONFIG_FILE_NAME, cwd.display());
                    Ok(Self::default())
                }
            },
        }
    }

    /// Resolves every relative path against `base`. `root_dir` defaults to
    /// `base` itself.
    #[must_use]
    pub fn anchored_at(mut self, base: &Path) -> Self {
        let anchor = |p: &PathBuf| absolutize(p, base);

        self.entries = self.entries.iter().map(anchor).collect();
        self.include_paths = self.include_paths.iter().map(anchor).collect();
        self.out_file = self.out_file.as_ref().map(anchor);
        self.out_dir = self.out_dir.as_ref().map(anchor);
        self.root_dir = Some(self.root_dir.as_ref().map_or_else(|| base.to_path_buf(), anchor));
        self
    }

    /// Applies `overrides` on top of `self`.
    ///
    /// Set scalars and non-empty lists in `overrides` win.
    #[must_use]
    pub fn merge(mut self, overrides: Self) -> Self {
        fn replace<T>(target: &mut Vec<T>, value: Vec<T>) {
            if !value.is_empty() {
                *target = value;
            }
        }

        replace(&mut self.entries, overrides.entries);
        replace(&mut self.dedupe_globs, overrides.dedupe_globs);
        replace(&mut self.include_paths, overrides.include_paths);
        replace(&mut self.ignore_imports, overrides.ignore_imports);

        if overrides.out_file.is_some() {
            self.out_file = overrides.out_file;
            self.out_dir = None;
        }
        if overrides.out_dir.is_some() {
            self.out_dir = overrides.out_dir;
            self.out_file = None;
        }
        self.root_dir = overrides.root_dir.or(self.root_dir);
        self.suffix = overrides.suffix.or(self.suffix);
        self.max_parallel = overrides.max_parallel.or(self.max_parallel);
        self.timeout_secs = overrides.timeout_secs.or(self.timeout_secs);
        self
    }

    /// Checks option combinations that cannot be honoured.
    ///
    /// # Errors
    ///
    /// - [`BundleError::NoEntries`] when there is nothing to bundle
    /// - [`BundleError::ConfigError`] for conflicting or zero-valued settings
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.entries.is_empty() {
            return Err(BundleError::NoEntries);
        }
        if self.out_file.is_some() && self.out_dir.is_some() {
            return Err(config_error("'out_file' and 'out_dir' cannot both be set"));
        }
        if self.out_file.is_some() && self.entries.len() > 1 {
            return Err(config_error(format!(
                "'out_file' needs exactly one entry, got {}; use 'out_dir' instead",
                self.entries.len()
            )));
        }
        if self.max_parallel == Some(0) {
            return Err(config_error("'max_parallel' must be at least 1"));
        }
        if self.timeout_secs == Some(0) {
            return Err(config_error("'timeout_secs' must be at least 1"));
        }
        if self.suffix.as_deref().is_some_and(str::is_empty) {
            return Err(config_error("'suffix' cannot be empty"));
        }
        Ok(())
    }

    /// Root directory, falling back to `cwd`.
    #[must_use]
    pub fn root(&self, cwd: &Path) -> PathBuf {
        self.root_dir.as_ref().map_or_else(|| cwd.to_path_buf(), |root| absolutize(root, cwd))
    }

    /// Time budget for one batch.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map_or_else(batch_operation_timeout, Duration::from_secs)
    }

    /// Builds engine options, compiling the ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidIgnorePattern`] for a malformed pattern.
    pub fn into_options(&self, cwd: &Path) -> Result<BundleOptions, BundleError> {
        let root = self.root(cwd);
        let include_paths = self.include_paths.iter().map(|p| absolutize(p, &root)).collect();

        Ok(BundleOptions::new(root)
            .with_suffix(self.suffix.clone().unwrap_or_else(|| DEFAULT_SUFFIX.to_string()))
            .with_include_paths(include_paths)
            .with_ignore_imports(ImportFilter::new(&self.ignore_imports)?)
            .with_max_parallel(self.max_parallel.unwrap_or_else(default_max_parallel)))
    }
}

fn config_error(message: impl Into<String>) -> BundleError {
    BundleError::ConfigError {
        message: message.into(),
    }
}
