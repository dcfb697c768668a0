//! File system utilities
//!
//! - [`paths`] - Lexical path normalisation and upward file discovery
//! - [`atomic`] - Write-temp-then-rename output writes

pub mod atomic;
pub mod paths;

pub use atomic::atomic_write;
pub use paths::{absolutize, current_dir, find_upwards, normalize_path};
