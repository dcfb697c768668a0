//! `bundle` - flatten entry stylesheets and write them out.
//!
//! # Examples
//!
//! ```bash
//! scss-bundler bundle src/main.scss -o dist/main.scss
//! scss-bundler bundle src/*.scss --out-dir dist --dedupe 'src/shared/**/*.scss'
//! scss-bundler bundle src/main.scss -I node_modules --ignore-import '^~'
//! ```
//!
//! Without `--out-file` or `--out-dir` (and nothing in the config file) the
//! bundles are printed to standard output in entry order.

use super::{CliContext, SourceArgs, run_batch};
use crate::bundler::{BundleNode, Bundler};
use crate::config::BundleConfig;
use crate::output::{OutputTarget, write_bundles};
use crate::utils::fs::{absolutize, current_dir};
use crate::utils::progress::ProgressBar;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct BundleCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Write the bundle to this file (single entry only)
    #[arg(short = 'o', long, value_name = "FILE", conflicts_with = "out_dir")]
    out_file: Option<PathBuf>,

    /// Write each bundle to DIR/<entry file name>
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Abort the run after this many seconds [default: 300]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl BundleCommand {
    pub(crate) fn source(&self) -> &SourceArgs {
        &self.source
    }

    fn overrides(&self, cwd: &Path) -> BundleConfig {
        BundleConfig {
            out_file: self.out_file.as_ref().map(|p| absolutize(p, cwd)),
            out_dir: self.out_dir.as_ref().map(|p| absolutize(p, cwd)),
            timeout_secs: self.timeout,
            ..self.source.to_config(cwd)
        }
    }

    /// Bundles every configured entry and writes the results.
    ///
    /// # Errors
    ///
    /// - configuration errors (no entries, conflicting outputs, bad patterns)
    /// - dedupe-glob expansion failure
    /// - [`Timeout`](crate::core::BundleError::Timeout) when the batch runs out of time
    /// - write failures
    /// - [`EntryNotFound`](crate::core::BundleError::EntryNotFound) after the
    ///   other entries were written, when any entry could not be read
    pub async fn execute(self, context: &CliContext) -> Result<()> {
        let cwd = current_dir()?;
        let config = context.load_config(self.overrides(&cwd), &cwd)?;
        let bundler = Bundler::new(config.into_options(&cwd)?);
        let target = OutputTarget::from_config(&config);

        let progress = ProgressBar::new(config.entries.len() as u64, context.no_progress);
        progress.set_message("Bundling");

        let nodes = run_batch(bundler, &config, &progress).await?;
        progress.finish_and_clear();

        let report = write_bundles(&nodes, &target, &mut std::io::stdout().lock())?;

        if !context.quiet && !report.written.is_empty() {
            eprintln!(
                "{} Bundled {} of {} entr{}",
                "✓".green(),
                report.written.len(),
                nodes.len(),
                if nodes.len() == 1 { "y" } else { "ies" }
            );
        }

        let unresolved = count_unresolved(&nodes);
        if !context.quiet && unresolved > 0 {
            eprintln!(
                "{} {} import(s) could not be inlined; look for the markers in the output",
                "⚠".yellow(),
                unresolved
            );
        }

        report.ensure_complete()?;
        Ok(())
    }
}

/// Imports below found entries that were left as not-found or circular markers.
fn count_unresolved(nodes: &[BundleNode]) -> usize {
    let mut count = 0;
    for entry in nodes.iter().filter(|node| node.found) {
        entry.walk(&mut |node, depth| {
            if depth > 0 && !node.found {
                count += 1;
            }
        });
    }
    count
}
