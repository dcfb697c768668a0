//! Global constants used throughout the scss-bundler codebase.
//!
//! This module contains the directive markers, file naming conventions, timeout
//! durations and parallelism parameters that are shared across multiple modules.
//! Defining them centrally makes magic values discoverable.

use std::time::Duration;

/// Suffix appended to an import path that does not already end with it.
pub const DEFAULT_SUFFIX: &str = ".scss";

/// Prefix of the partial-file naming convention (`_button.scss`).
pub const PARTIAL_PREFIX: &str = "_";

/// Name of the optional project configuration file.
pub const CONFIG_FILE_NAME: &str = "scss-bundler.toml";

/// Environment variable that disables progress bars when set to any value.
pub const NO_PROGRESS_ENV: &str = "SCSS_BUNDLER_NO_PROGRESS";

/// Header of the placeholder substituted for an import whose file does not exist.
pub const NOT_FOUND_MARKER: &str = "/*** IMPORTED FILE NOT FOUND ***/";

/// Header of the placeholder substituted for an import that would recurse into itself.
pub const CIRCULAR_MARKER: &str = "/*** CIRCULAR IMPORT SKIPPED ***/";

/// Footer closing either diagnostic placeholder.
pub const MARKER_END: &str = "/*** --- ***/";

/// Timeout for a whole `bundle_all` batch (5 minutes).
///
/// The CLI discards the bundler and all of its caches when this elapses.
pub fn batch_operation_timeout() -> Duration {
    Duration::from_secs(300)
}

/// Minimum number of parallel entry tasks regardless of CPU count.
pub const MIN_PARALLELISM: usize = 10;

/// Multiplier applied to CPU core count for default parallelism.
///
/// Bundling is dominated by small file reads, so oversubscribing the cores
/// keeps the runtime busy while reads are in flight.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Default CPU core count when detection fails.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Default number of entry files bundled concurrently.
pub fn default_max_parallel() -> usize {
    let cores = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(FALLBACK_CORE_COUNT);
    (cores * PARALLELISM_CORE_MULTIPLIER).max(MIN_PARALLELISM)
}
