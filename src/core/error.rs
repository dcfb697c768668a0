//! Error handling for scss-bundler
//!
//! This module provides the error types and user-friendly error reporting for the
//! bundler. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`BundleError`] - Enumerated error types for run-level failures
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! Most problems met while bundling are *not* errors: an unreadable entry file
//! yields a node with `found == false`, and an unresolved import is replaced by a
//! diagnostic marker in the output. Only failures that would make the whole run
//! untrustworthy (for example a dedupe glob that cannot be expanded) surface here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scss_bundler::core::{BundleError, ErrorContext, user_friendly_error};
//!
//! let error = BundleError::NoEntries;
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Pass entry files on the command line")
//!     .with_details("No entries were given and the config file lists none");
//!
//! context.display();
//!
//! let friendly = user_friendly_error(anyhow::Error::from(BundleError::NoEntries));
//! eprintln!("{friendly}");
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for scss-bundler operations
///
/// Each variant represents one specific failure mode and carries the paths or
/// patterns needed to explain it to a user.
///
/// # Error Categories
///
/// ## Dedup Set Construction
/// - [`InvalidGlobPattern`] - A dedupe glob has invalid syntax
/// - [`GlobExpansionFailed`] - Walking the file system for a glob failed
///
/// ## Configuration
/// - [`InvalidIgnorePattern`] - An ignore-import regex does not compile
/// - [`ConfigError`] - Inconsistent settings (e.g. `out_file` with many entries)
/// - [`ConfigParseError`] - `scss-bundler.toml` is not valid TOML
/// - [`NoEntries`] - Nothing to bundle
///
/// ## Run Outcome
/// - [`EntryNotFound`] - An entry file could not be read
/// - [`Timeout`] - The batch exceeded its time budget
///
/// ## File System
/// - [`FileSystemError`] - Generic file system failure
/// - [`PermissionDenied`] - Insufficient permissions
///
/// [`InvalidGlobPattern`]: BundleError::InvalidGlobPattern
/// [`GlobExpansionFailed`]: BundleError::GlobExpansionFailed
/// [`InvalidIgnorePattern`]: BundleError::InvalidIgnorePattern
/// [`ConfigError`]: BundleError::ConfigError
/// [`ConfigParseError`]: BundleError::ConfigParseError
/// [`NoEntries`]: BundleError::NoEntries
/// [`EntryNotFound`]: BundleError::EntryNotFound
/// [`Timeout`]: BundleError::Timeout
/// [`FileSystemError`]: BundleError::FileSystemError
/// [`PermissionDenied`]: BundleError::PermissionDenied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// A dedupe glob pattern has invalid syntax
    #[error("Invalid dedupe glob pattern '{pattern}'")]
    InvalidGlobPattern {
        /// The pattern as given by the caller
        pattern: String,
        /// Parser message from the glob library
        reason: String,
    },

    /// Expanding a dedupe glob pattern failed part-way through
    ///
    /// The whole batch is aborted: silently using a partial dedup set could
    /// inline files that were meant to be deduplicated.
    #[error("Failed to expand dedupe glob pattern '{pattern}'")]
    GlobExpansionFailed {
        /// The pattern being expanded
        pattern: String,
        /// The underlying I/O failure
        reason: String,
    },

    /// An ignore-import regular expression does not compile
    #[error("Invalid ignore-import pattern '{pattern}'")]
    InvalidIgnorePattern {
        /// The regular expression as given
        pattern: String,
        /// Compiler message from the regex library
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration file parsing error
    #[error("Invalid configuration file syntax in {file}")]
    ConfigParseError {
        /// Path to the configuration file
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// No entry files were given
    #[error("No entry files to bundle")]
    NoEntries,

    /// An entry file could not be read
    #[error("Entry file not found: {path}")]
    EntryNotFound {
        /// The entry path as resolved
        path: String,
    },

    /// The batch did not finish within its time budget
    #[error("Bundling timed out after {seconds}s")]
    Timeout {
        /// The configured budget in seconds
        seconds: u64,
    },

    /// File system operation failed
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// The operation that failed (e.g. "write", "create directory")
        operation: String,
        /// The path involved
        path: String,
    },

    /// Permission denied for a file operation
    #[error("Permission denied: {operation} on {path}")]
    PermissionDenied {
        /// The operation that was denied
        operation: String,
        /// The path involved
        path: String,
    },

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Description of the error
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
///
/// Suggestions are shown in green and details in yellow when displayed in a
/// terminal.
///
/// # Examples
///
/// ```rust,no_run
/// use scss_bundler::core::{BundleError, ErrorContext};
///
/// let context = ErrorContext::new(BundleError::Timeout { seconds: 300 })
///     .with_suggestion("Raise --timeout or reduce the number of entries")
///     .with_details("All caches from the interrupted run were discarded");
///
/// println!("{context}");
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BundleError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details
    #[must_use]
    pub const fn new(error: BundleError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message in red with "error:" prefix
    /// - Details in yellow with "Details:" prefix
    /// - Suggestion in green with "Suggestion:" prefix
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "Details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "Suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Known error types ([`BundleError`], [`std::io::Error`], [`toml::de::Error`],
/// [`super::file_error::FileOperationError`]) get tailored suggestions. Anything
/// else is wrapped in [`BundleError::Other`] with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bundle_error) = error.downcast_ref::<BundleError>() {
        return create_error_context(bundle_error.clone());
    }

    if let Some(file_error) = error.downcast_ref::<super::file_error::FileOperationError>() {
        return ErrorContext::new(BundleError::FileSystemError {
            operation: file_error.operation.to_string(),
            path: file_error.file_path.display().to_string(),
        })
        .with_details(file_error.user_message());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BundleError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the stylesheet tree and output directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BundleError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return create_error_context(BundleError::ConfigParseError {
            file: crate::constants::CONFIG_FILE_NAME.to_string(),
            reason: toml_error.to_string(),
        });
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BundleError::Other {
        message,
    })
}

fn create_error_context(error: BundleError) -> ErrorContext {
    match &error {
        BundleError::InvalidGlobPattern { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the --dedupe pattern; supported syntax is *, **, ?, [abc] and [a-z]")
            .with_details(reason.clone()),

        BundleError::GlobExpansionFailed { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check that every directory matched by the pattern is readable")
            .with_details(format!(
                "{reason}\nThe run was aborted rather than bundling with an incomplete dedupe set"
            )),

        BundleError::InvalidIgnorePattern { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion("Ignore-import patterns are regular expressions; escape literal dots as \\.")
            .with_details(reason.clone()),

        BundleError::ConfigError { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Review the options in scss-bundler.toml and on the command line"),

        BundleError::ConfigParseError { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the TOML syntax in scss-bundler.toml. Verify quotes, brackets and key names")
            .with_details(reason.clone()),

        BundleError::NoEntries => ErrorContext::new(error.clone())
            .with_suggestion("Pass entry files, e.g. 'scss-bundler bundle src/main.scss', or list them under 'entries' in scss-bundler.toml"),

        BundleError::EntryNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the entry path; entries are resolved relative to the root directory")
            .with_details("Other entries in the same run were still bundled and written"),

        BundleError::Timeout { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Raise --timeout or bundle fewer entries per run")
            .with_details("Partially built caches from the interrupted run were discarded"),

        BundleError::PermissionDenied { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check file ownership and permissions"),

        BundleError::FileSystemError { .. } | BundleError::Other { .. } => {
            ErrorContext::new(error.clone())
        }
    }
}
