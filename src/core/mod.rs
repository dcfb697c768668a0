//! Core types shared by every part of scss-bundler
//!
//! ## `error` - Error Handling
//!
//! - [`BundleError`] - Enumerated run-level failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! ## `file_error` - File Operation Context
//!
//! - [`FileOperation`] / [`FileOperationError`] - I/O failures tagged with path and purpose
//! - [`FileResultExt`] - `with_file_context` on `Result<T, std::io::Error>`

pub mod error;
pub mod file_error;

pub use error::{BundleError, ErrorContext, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
