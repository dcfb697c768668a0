//! Cross-platform utilities and helpers
//!
//! - [`fs`] - Path normalisation, upward discovery and atomic writes
//! - [`progress`] - Progress bars for batch runs

pub mod fs;
pub mod progress;

pub use fs::{absolutize, atomic_write, normalize_path};
pub use progress::ProgressBar;
