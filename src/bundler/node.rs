//! The recursive result record produced for every bundled file and import.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One file's resolution outcome and, recursively, its imports.
///
/// `content` is present only for an entry file and for the first time an
/// import target is bundled. Later references to the same file carry the child
/// list recorded at that first bundling but no content of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleNode {
    /// Absolute, normalized path. For an unresolved import this is the
    /// suffixed candidate next to the importing file.
    pub path: PathBuf,

    /// Whether the file was found and read.
    pub found: bool,

    /// Fully bundled text.
    #[serde(skip)]
    pub content: Option<Arc<str>>,

    /// This occurrence was elided because the file was already included.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deduped: bool,

    /// This occurrence was skipped because it would recurse into a file that
    /// is still being bundled further up the chain.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cyclic: bool,

    /// One node per live import directive, in source order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<BundleNode>,
}

impl BundleNode {
    /// A freshly bundled file.
    #[must_use]
    pub fn bundled(path: PathBuf, content: Arc<str>, imports: Vec<BundleNode>) -> Self {
        Self {
            path,
            found: true,
            content: Some(content),
            deduped: false,
            cyclic: false,
            imports,
        }
    }

    /// A repeat reference to an already bundled file.
    #[must_use]
    pub fn reference(path: PathBuf, imports: Vec<BundleNode>) -> Self {
        Self {
            path,
            found: true,
            content: None,
            deduped: false,
            cyclic: false,
            imports,
        }
    }

    /// A file that does not exist or could not be read.
    #[must_use]
    pub fn not_found(path: PathBuf) -> Self {
        Self {
            path,
            found: false,
            content: None,
            deduped: false,
            cyclic: false,
            imports: Vec::new(),
        }
    }

    /// An import skipped because it closes a cycle.
    #[must_use]
    pub fn cyclic(path: PathBuf) -> Self {
        Self {
            cyclic: true,
            ..Self::not_found(path)
        }
    }

    /// Marks this occurrence as deduplicated and drops its content.
    #[must_use]
    pub fn into_deduped(mut self) -> Self {
        self.deduped = true;
        self.content = None;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bundled text, or `""` when this node carries none.
    #[must_use]
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Total number of nodes in this tree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.imports.iter().map(Self::node_count).sum::<usize>()
    }

    /// Visits every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Self, usize)) {
        visit(self, depth);
        for child in &self.imports {
            child.walk_at(depth + 1, visit);
        }
    }
}
