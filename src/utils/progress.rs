//! Progress indicators for long-running batches
//!
//! A thin wrapper around `indicatif` with the crate's styling. Progress bars are
//! hidden when:
//! - the caller asks for it (`--no-progress`, `--quiet`)
//! - the `SCSS_BUNDLER_NO_PROGRESS` environment variable is set
//!
//! # Examples
//!
//! ```rust
//! use scss_bundler::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new(3, false);
//! progress.set_message("Bundling entries");
//! for _ in 0..3 {
//!     progress.inc(1);
//! }
//! progress.finish_with_message("Bundled 3 entries");
//! ```

use crate::constants::NO_PROGRESS_ENV;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV).is_ok()
}

/// A progress bar with consistent styling that can be shared across tasks.
///
/// Cloning is cheap; all clones drive the same bar.
#[derive(Clone, Debug)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a progress bar for `len` units of work.
    ///
    /// When `hidden` is true, or progress is disabled through the environment,
    /// the bar silently ignores every update.
    #[must_use]
    pub fn new(len: u64, hidden: bool) -> Self {
        let bar = if hidden || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Sets the message displayed alongside the bar.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Advances the bar by `delta` units.
    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Completes the bar and leaves `msg` on screen.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    /// Completes the bar and removes it from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Whether updates are being drawn.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("=>-")
}
