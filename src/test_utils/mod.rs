//! Test utilities for scss-bundler
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] for `tracing` output under `cargo test`
//! - [`ProjectFixture`] for throwaway stylesheet projects on disk
//!
//! # Example
//!
//! ```rust,no_run
//! use scss_bundler::test_utils::ProjectFixture;
//!
//! let project = ProjectFixture::new().unwrap();
//! project.write("main.scss", "@import 'base';").unwrap();
//! project.write("_base.scss", "body { margin: 0; }").unwrap();
//! assert!(project.exists("_base.scss"));
//! ```

pub mod fixtures;

pub use fixtures::ProjectFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=scss_bundler=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
