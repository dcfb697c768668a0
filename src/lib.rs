//! scss-bundler - flatten SCSS `@import` trees into single stylesheets
//!
//! Given one or more entry stylesheets, every live `@import 'path';` directive
//! is replaced by the imported file's own bundled content, recursively. The
//! result is one self-contained document per entry, ready to be handed to a
//! compiler or served as-is.
//!
//! # Architecture Overview
//!
//! - [`directive`] - Finds live `@import` directives and strips commented ones
//! - [`bundler`] - The recursive engine, its path resolver and the run-scoped
//!   shared caches; also the concurrent batch runner
//! - [`pattern`] - Expands dedupe globs into the set of files inlined once
//! - [`config`] - Optional `scss-bundler.toml` project configuration
//! - [`output`] - Writes bundles to files, a directory or stdout
//! - [`cli`] - `bundle` and `tree` commands
//! - [`core`] - Error types and user-facing error rendering
//! - [`utils`] - Path normalisation, atomic writes, progress bars
//!
//! # Resolution Rules
//!
//! For `@import 'components/button';` in `src/main.scss`:
//!
//! 1. `src/components/button.scss`
//! 2. `src/components/_button.scss` (partial)
//! 3. the same two under every include path
//!
//! An unresolved import is replaced by a visible marker that quotes the
//! original directive:
//!
//! ```text
//! /*** IMPORTED FILE NOT FOUND ***/
//! @import 'components/button';/*** --- ***/
//! ```
//!
//! # Caching And Deduplication
//!
//! Within one run each file is read and bundled at most once, however many
//! entries or files import it. Files matched by a dedupe glob are inlined
//! only at their first import site; later imports of them contribute
//! nothing. Import cycles are broken with a `CIRCULAR IMPORT SKIPPED` marker.
//!
//! # Example
//!
//! ```rust,no_run
//! use scss_bundler::bundler::{BundleOptions, Bundler};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let bundler = Bundler::new(BundleOptions::new("/project"));
//! let node = bundler.bundle(Path::new("src/main.scss"), &["src/shared/**/*.scss"]).await?;
//!
//! if node.found {
//!     std::fs::write("dist/main.scss", node.content_str())?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod bundler;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod directive;
pub mod output;
pub mod pattern;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
