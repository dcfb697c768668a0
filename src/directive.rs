//! Import directive extraction.
//!
//! The bundler never parses SCSS. It recognises two textual shapes:
//!
//! - **Live directive**: `@import 'path';` or `@import "path";`, with exactly
//!   one space and matching quotes
//! - **Commented directive**: `//@import 'path';`, which is removed from the
//!   text before scanning so that it stays inert
//!
//! # Known Limitation
//!
//! Stripping is textual, not a comment parser. A commented directive inside a
//! string literal or a block comment is still stripped, and a directive inside
//! a `/* ... */` block comment is still treated as live. A commented directive
//! written with double quotes (`//@import "x";`) does not match the inert shape,
//! so its inner `@import "x";` is picked up as live.
//!
//! # Examples
//!
//! ```rust
//! use scss_bundler::directive::{scan, strip_commented};
//!
//! let source = "//@import 'old';\n@import 'base';\n@import \"theme/colors\";\n";
//! let stripped = strip_commented(source);
//! let directives = scan(&stripped);
//!
//! assert_eq!(directives.len(), 2);
//! assert_eq!(directives[0].path, "base");
//! assert_eq!(directives[1].text, "@import \"theme/colors\";");
//! ```

use crate::core::BundleError;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

static LIVE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, cannot fail to compile.
    Regex::new(r#"@import (?:'([^']+)'|"([^"]+)");"#).expect("live import pattern is valid")
});

static COMMENTED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//@import '[^']+';").expect("commented import pattern is valid")
});

/// One live import directive found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The exact matched text, e.g. `@import 'base';`
    pub text: String,
    /// The referenced path as written, e.g. `base`
    pub path: String,
    /// Byte range of `text` within the scanned content
    pub span: Range<usize>,
}

/// Removes every commented-out directive from `content`.
///
/// Returns the input unchanged (borrowed) when there is nothing to strip.
#[must_use]
pub fn strip_commented(content: &str) -> Cow<'_, str> {
    COMMENTED_IMPORT.replace_all(content, "")
}

/// Finds every live directive in `content`, in appearance order.
///
/// Identical directive text appearing several times yields one [`Directive`]
/// per occurrence, each with its own span.
#[must_use]
pub fn scan(content: &str) -> Vec<Directive> {
    let directives: Vec<Directive> = LIVE_IMPORT
        .captures_iter(content)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let path = cap.get(1).or_else(|| cap.get(2))?;
            Some(Directive {
                text: whole.as_str().to_string(),
                path: path.as_str().to_string(),
                span: whole.range(),
            })
        })
        .collect();

    tracing::trace!("Scanned {} import directive(s)", directives.len());
    directives
}

/// Builds the diagnostic placeholder substituted for an import that could not
/// be inlined. The original directive text is embedded so the output stays
/// inspectable and a downstream compiler reports the same import.
#[must_use]
pub fn diagnostic_marker(header: &str, directive_text: &str) -> String {
    format!("{header}\n{directive_text}{}", crate::constants::MARKER_END)
}

/// Import paths that are left untouched in the output.
///
/// Built from user-supplied regular expressions; a directive whose raw path
/// matches any of them is neither resolved nor counted.
#[derive(Debug, Clone, Default)]
pub struct ImportFilter {
    patterns: Vec<Regex>,
}

impl ImportFilter {
    /// Compiles the ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidIgnorePattern`] for the first pattern that
    /// does not compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, BundleError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| BundleError::InvalidIgnorePattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
        })
    }

    /// Whether `import_path` should be left as written.
    #[must_use]
    pub fn is_ignored(&self, import_path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(import_path))
    }

    /// Whether no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
