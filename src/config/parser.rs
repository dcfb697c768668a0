//! Generic configuration parsing utilities.
//!
//! Reads a TOML file and deserializes it into any `DeserializeOwned` type,
//! attaching the file path to both read and parse failures.
//!
//! Example error output:
//! ```text
//! Invalid configuration file syntax in /project/scss-bundler.toml
//! ```

use crate::core::{BundleError, FileOperation, FileResultExt};
use anyhow::Result;
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Errors
///
/// - a [`FileOperationError`](crate::core::FileOperationError) when the file
///   cannot be read
/// - [`BundleError::ConfigParseError`] when the content is not valid TOML or
///   does not match `T`
///
/// # Examples
///
/// ```rust,no_run
/// use scss_bundler::config::parse_config;
/// use serde::Deserialize;
/// use std::path::Path;
///
/// #[derive(Deserialize)]
/// struct Config {
///     suffix: String,
/// }
///
/// # fn example() -> anyhow::Result<()> {
/// let config: Config = parse_config(Path::new("scss-bundler.toml"))?;
/// println!("suffix: {}", config.suffix);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).with_file_context(
        FileOperation::Read,
        path,
        "reading configuration file",
        "parse_config",
    )?;

    let config: T = toml::from_str(&content).map_err(|e| BundleError::ConfigParseError {
        file: path.display().to_string(),
        reason: e.message().to_string(),
    })?;

    Ok(config)
}
