//! Command-line interface for scss-bundler.
//!
//! # Available Commands
//!
//! - `bundle` - Flatten entry stylesheets and write the results
//! - `tree` - Show each entry's import tree without writing anything
//!
//! # Command Usage Patterns
//!
//! ```bash
//! # Bundle one file to stdout
//! scss-bundler bundle src/main.scss
//!
//! # Bundle several entries into dist/, inlining shared partials once
//! scss-bundler bundle src/main.scss src/admin.scss --out-dir dist \
//!     --dedupe 'src/shared/**/*.scss'
//!
//! # Use the entries and options from scss-bundler.toml
//! scss-bundler bundle
//!
//! # Inspect what would be inlined
//! scss-bundler tree src/main.scss --depth 2
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only warnings and errors
//! - `--no-progress` - Disable progress bars
//! - `--config` - Use a specific `scss-bundler.toml`
//!
//! Command-line values override the configuration file; see
//! [`BundleConfig::merge`](crate::config::BundleConfig::merge).

pub mod bundle;
pub mod tree;

use crate::bundler::{BundleNode, Bundler};
use crate::config::BundleConfig;
use crate::core::BundleError;
use crate::utils::fs::absolutize;
use crate::utils::progress::ProgressBar;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags, handed to every command.
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    /// Hide progress bars.
    pub no_progress: bool,
    /// Suppress the summary line.
    pub quiet: bool,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliContext {
    /// Loads the configuration file (explicit or discovered), applies the
    /// command-line `overrides` and validates the result.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be loaded or the merged settings are invalid.
    pub fn load_config(&self, overrides: BundleConfig, cwd: &Path) -> Result<BundleConfig> {
        let config =
            BundleConfig::discover(self.config_path.as_deref(), cwd)?.merge(overrides);
        config.validate()?;
        Ok(config)
    }
}

/// Main CLI application structure for scss-bundler.
#[derive(Parser, Debug)]
#[command(
    name = "scss-bundler",
    about = "Bundle SCSS @import trees into single stylesheets",
    version,
    long_about = "scss-bundler inlines every @import of an entry stylesheet, recursively, \
                  producing one flattened file per entry. Shared partials can be \
                  deduplicated across a whole batch."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars
    ///
    /// Also disabled by setting `SCSS_BUNDLER_NO_PROGRESS`.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Path to scss-bundler.toml (default: search upwards from the current directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bundle entry stylesheets.
    ///
    /// See [`bundle::BundleCommand`] for options.
    Bundle(bundle::BundleCommand),

    /// Display the import tree of entry stylesheets.
    ///
    /// See [`tree::TreeCommand`] for options.
    Tree(tree::TreeCommand),
}

impl Cli {
    /// Runs the selected command.
    ///
    /// # Errors
    ///
    /// Returns the command's error for `main` to render.
    pub async fn execute(self) -> Result<()> {
        let context = self.build_context();

        match self.command {
            Commands::Bundle(cmd) => cmd.execute(&context).await,
            Commands::Tree(cmd) => cmd.execute(&context).await,
        }
    }

    /// Translates the global flags into a [`CliContext`].
    #[must_use]
    pub fn build_context(&self) -> CliContext {
        CliContext {
            no_progress: self.no_progress || self.quiet,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Default log directive for the verbosity flags.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));

        // A subscriber may already be installed (tests, embedding); keep it.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .ok();
    }
}

/// Entry and resolution options shared by `bundle` and `tree`.
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Entry stylesheets (default: `entries` from scss-bundler.toml)
    #[arg(value_name = "ENTRY")]
    entries: Vec<PathBuf>,

    /// Glob of files to inline at most once per run (repeatable)
    #[arg(long = "dedupe", value_name = "GLOB")]
    dedupe_globs: Vec<String>,

    /// Extra directory to search for imports (repeatable)
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    include_paths: Vec<PathBuf>,

    /// Regular expression of import paths to leave untouched (repeatable)
    #[arg(long = "ignore-import", value_name = "REGEX")]
    ignore_imports: Vec<String>,

    /// Suffix appended to import paths without it [default: .scss]
    #[arg(long)]
    suffix: Option<String>,

    /// Base directory for dedupe globs
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Maximum number of entries bundled at once
    #[arg(long, value_name = "N")]
    max_parallel: Option<usize>,
}

impl SourceArgs {
    /// Command-line values as a config layer, with paths made absolute
    /// against `cwd`.
    fn to_config(&self, cwd: &Path) -> BundleConfig {
        BundleConfig {
            entries: self.entries.iter().map(|p| absolutize(p, cwd)).collect(),
            dedupe_globs: self.dedupe_globs.clone(),
            include_paths: self.include_paths.iter().map(|p| absolutize(p, cwd)).collect(),
            ignore_imports: self.ignore_imports.clone(),
            suffix: self.suffix.clone(),
            root_dir: self.root.as_ref().map(|p| absolutize(p, cwd)),
            max_parallel: self.max_parallel,
            ..BundleConfig::default()
        }
    }
}

/// Runs one batch under the configured time budget.
///
/// On timeout the bundler, and with it every partially filled cache, is
/// dropped before the error is returned.
pub(crate) async fn run_batch(
    bundler: Bundler,
    config: &BundleConfig,
    progress: &ProgressBar,
) -> Result<Vec<BundleNode>> {
    let timeout = config.timeout();
    let batch = bundler.bundle_all_with_progress(
        &config.entries,
        &config.dedupe_globs,
        Some(progress),
    );

    let outcome = tokio::time::timeout(timeout, batch).await;
    match outcome {
        Ok(nodes) => {
            let nodes = nodes?;
            info!("Run statistics: {}", bundler.state().stats());
            Ok(nodes)
        }
        Err(_) => {
            progress.finish_and_clear();
            drop(bundler);
            Err(BundleError::Timeout {
                seconds: timeout.as_secs(),
            }
            .into())
        }
    }
}
