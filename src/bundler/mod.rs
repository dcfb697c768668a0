//! The bundle engine and batch runner.
//!
//! A [`Bundler`] turns an entry stylesheet into one flattened document by
//! replacing every live `@import` directive with the imported file's own
//! bundled content, recursively.
//!
//! # Per-File Algorithm
//!
//! 1. Strip commented-out directives
//! 2. Scan the remaining text for live directives, in order
//! 3. For each directive:
//!    - leave it verbatim when its raw path matches an ignore pattern
//!    - resolve it (suffix, partial fallback, include paths)
//!    - not found: substitute a `IMPORTED FILE NOT FOUND` marker
//!    - cycle: substitute a `CIRCULAR IMPORT SKIPPED` marker
//!    - first encounter: bundle the target recursively and inline it
//!    - later encounter: count it and inline the cached content, or nothing
//!      when the target is in the dedupe set
//! 4. Publish the result to the shared content cache
//!
//! # Sharing
//!
//! All caches live in one [`BundleState`] owned by the bundler. Cloning a
//! `Bundler` shares that state; [`bundle_all`](Bundler::bundle_all) relies on
//! this to run entries on separate tasks. Use a fresh `Bundler` for an
//! independent run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scss_bundler::bundler::{BundleOptions, Bundler};
//! use std::path::PathBuf;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let bundler = Bundler::new(BundleOptions::new("/project"));
//! let entries = vec![PathBuf::from("src/main.scss"), PathBuf::from("src/admin.scss")];
//!
//! let nodes = bundler.bundle_all(&entries, &["src/shared/**/*.scss"]).await?;
//! for node in &nodes {
//!     println!("{}: {} bytes", node.path.display(), node.content_str().len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod node;
pub mod resolver;
pub mod state;

pub use node::BundleNode;
pub use resolver::{Resolved, Resolver};
pub use state::{BundleState, BundleStats};

use crate::constants::{CIRCULAR_MARKER, DEFAULT_SUFFIX, NOT_FOUND_MARKER, default_max_parallel};
use crate::directive::{self, Directive, ImportFilter};
use crate::pattern::DedupSet;
use crate::utils::fs::absolutize;
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, stream};
use state::Acquired;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

/// Settings shared by every file of a run.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Appended to import paths that do not already end with it.
    pub suffix: String,
    /// Extra directories searched after the importing file's directory.
    pub include_paths: Vec<PathBuf>,
    /// Imports left verbatim in the output.
    pub ignore_imports: ImportFilter,
    /// Base directory for relative entries and dedupe globs.
    pub root: PathBuf,
    /// Upper bound on entries bundled concurrently.
    pub max_parallel: usize,
}

impl BundleOptions {
    /// Default options rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            include_paths: Vec::new(),
            ignore_imports: ImportFilter::default(),
            root: root.into(),
            max_parallel: default_max_parallel(),
        }
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_paths = include_paths;
        self
    }

    #[must_use]
    pub fn with_ignore_imports(mut self, ignore_imports: ImportFilter) -> Self {
        self.ignore_imports = ignore_imports;
        self
    }

    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }
}

/// Recursive `@import` bundler with a run-scoped shared cache.
#[derive(Debug, Clone)]
pub struct Bundler {
    options: Arc<BundleOptions>,
    resolver: Arc<Resolver>,
    state: Arc<BundleState>,
}

impl Bundler {
    #[must_use]
    pub fn new(options: BundleOptions) -> Self {
        let root = options.root.clone();
        let include_paths =
            options.include_paths.iter().map(|include| absolutize(include, &root)).collect();
        let resolver = Resolver::new(options.suffix.clone(), include_paths);

        Self {
            options: Arc::new(options),
            resolver: Arc::new(resolver),
            state: Arc::new(BundleState::new()),
        }
    }

    #[must_use]
    pub fn options(&self) -> &BundleOptions {
        &self.options
    }

    /// The shared caches and counters of this run.
    #[must_use]
    pub fn state(&self) -> &BundleState {
        &self.state
    }

    /// Bundles one entry file.
    ///
    /// A missing or unreadable entry yields a node with `found == false`.
    ///
    /// # Errors
    ///
    /// Fails only when the dedupe patterns cannot be expanded.
    pub async fn bundle<S: AsRef<str>>(&self, entry: &Path, dedupe_globs: &[S]) -> Result<BundleNode> {
        let dedup = self.expand_dedup(dedupe_globs).await?;
        Ok(self.bundle_with_dedup(entry, &dedup).await)
    }

    /// Bundles every entry concurrently, returning nodes in input order.
    ///
    /// The dedupe patterns are expanded once and shared by all entries.
    ///
    /// # Errors
    ///
    /// Fails when the dedupe patterns cannot be expanded or an entry task
    /// panics.
    pub async fn bundle_all<S: AsRef<str>>(
        &self,
        entries: &[PathBuf],
        dedupe_globs: &[S],
    ) -> Result<Vec<BundleNode>> {
        self.bundle_all_with_progress(entries, dedupe_globs, None).await
    }

    /// [`bundle_all`](Self::bundle_all), advancing `progress` once per
    /// finished entry.
    ///
    /// Dropping the returned future (on a timeout, say) aborts the entry tasks
    /// still running. The bundler's state is then incomplete and must be
    /// dropped with it.
    pub async fn bundle_all_with_progress<S: AsRef<str>>(
        &self,
        entries: &[PathBuf],
        dedupe_globs: &[S],
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<BundleNode>> {
        let dedup = Arc::new(self.expand_dedup(dedupe_globs).await?);
        let max_parallel = self.options.max_parallel.max(1);

        debug!(
            "Bundling {} entr{} with up to {} in parallel ({} dedupe path(s))",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" },
            max_parallel,
            dedup.len()
        );

        let tasks = entries.iter().cloned().map(|entry| {
            let bundler = self.clone();
            let dedup = Arc::clone(&dedup);
            let progress = progress.cloned();
            AbortOnDrop(tokio::spawn(async move {
                let node = bundler.bundle_with_dedup(&entry, &dedup).await;
                if let Some(progress) = progress {
                    progress.inc(1);
                }
                node
            }))
        });

        let results: Vec<_> = stream::iter(tasks).buffered(max_parallel).collect().await;

        results
            .into_iter()
            .map(|result| result.context("Entry bundling task failed"))
            .collect()
    }

    /// Bundles one entry against an already expanded dedupe set.
    ///
    /// Relative entries are taken from the configured root. The entry itself
    /// is not an import encounter, so it never counts toward deduplication.
    pub async fn bundle_with_dedup(&self, entry: &Path, dedup: &DedupSet) -> BundleNode {
        let path = absolutize(entry, &self.options.root);

        match self.state.acquire(&path, None).await {
            Acquired::Claimed => match self.bundle_claimed(&path, dedup, false).await {
                Some((node, _)) => node,
                None => {
                    warn!("Entry file {} could not be read", path.display());
                    BundleNode::not_found(path)
                }
            },
            Acquired::Cached(content) => {
                debug!("Entry {} already bundled in this run", path.display());
                let imports = self.state.child_imports(&path);
                BundleNode::bundled(path, content, imports)
            }
            // Entries are never cycle-checked.
            Acquired::Unreadable | Acquired::Cycle => {
                self.state.record_not_found();
                warn!("Entry file {} could not be read", path.display());
                BundleNode::not_found(path)
            }
        }
    }

    async fn expand_dedup<S: AsRef<str>>(&self, dedupe_globs: &[S]) -> Result<DedupSet> {
        if dedupe_globs.is_empty() {
            return Ok(DedupSet::empty());
        }

        let patterns: Vec<String> = dedupe_globs.iter().map(|p| p.as_ref().to_string()).collect();
        let root = self.options.root.clone();

        let dedup = tokio::task::spawn_blocking(move || DedupSet::expand(&patterns, &root))
            .await
            .context("Dedupe pattern expansion task failed")??;

        Ok(dedup)
    }

    /// Reads, bundles and publishes a path whose slot the caller has claimed.
    ///
    /// Returns `None` (and marks the slot unreadable) when the file cannot be
    /// read. Otherwise returns the node and the usage count after publishing.
    async fn bundle_claimed(
        &self,
        path: &Path,
        dedup: &DedupSet,
        counted: bool,
    ) -> Option<(BundleNode, usize)> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Failed to read {}: {}", path.display(), e);
                self.state.fail(path);
                self.state.record_not_found();
                return None;
            }
        };
        self.state.record_read(path);

        let (content, imports) = self.process_file(path.to_path_buf(), raw, dedup).await;
        let content: Arc<str> = Arc::from(content);
        let count = self.state.complete(path, Arc::clone(&content), imports.clone(), counted);

        Some((BundleNode::bundled(path.to_path_buf(), content, imports), count))
    }

    /// Substitutes every directive of one file, returning the bundled text and
    /// one child node per directive that was resolved.
    fn process_file<'a>(
        &'a self,
        path: PathBuf,
        raw: String,
        dedup: &'a DedupSet,
    ) -> BoxFuture<'a, (String, Vec<BundleNode>)> {
        async move {
            let stripped = directive::strip_commented(&raw);
            let directives = directive::scan(&stripped);
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

            let mut output = String::with_capacity(stripped.len());
            let mut imports = Vec::with_capacity(directives.len());
            let mut cursor = 0;

            for directive in &directives {
                output.push_str(&stripped[cursor..directive.span.start]);
                cursor = directive.span.end;

                if self.options.ignore_imports.is_ignored(&directive.path) {
                    debug!("Leaving ignored import '{}' in {}", directive.path, path.display());
                    output.push_str(&directive.text);
                    continue;
                }

                let (child, substitution) = self.import(&path, &dir, directive, dedup).await;
                output.push_str(&substitution);
                imports.push(child);
            }
            output.push_str(&stripped[cursor..]);

            (output, imports)
        }
        .boxed()
    }

    /// Resolves one directive and decides what replaces it.
    async fn import(
        &self,
        current: &Path,
        dir: &Path,
        directive: &Directive,
        dedup: &DedupSet,
    ) -> (BundleNode, String) {
        let resolved = self.resolver.resolve(&directive.path, dir).await;
        if !resolved.found {
            warn!("Import '{}' in {} not found", directive.path, current.display());
            self.state.record_not_found();
            return (
                BundleNode::not_found(resolved.path),
                directive::diagnostic_marker(NOT_FOUND_MARKER, &directive.text),
            );
        }
        let target = resolved.path;

        self.state.enter(current, &target);
        let acquired = self.state.acquire(&target, Some(current)).await;
        let outcome = match acquired {
            Acquired::Claimed => self
                .bundle_claimed(&target, dedup, true)
                .await
                .map(|(node, count)| {
                    let content = node.content.clone().unwrap_or_else(|| Arc::from(""));
                    (node, content, count)
                }),
            Acquired::Cached(content) => {
                let count = self.state.record_use(&target);
                debug!("Reusing {} (use #{})", target.display(), count);
                let imports = self.state.child_imports(&target);
                Some((BundleNode::reference(target.clone(), imports), content, count))
            }
            Acquired::Unreadable => {
                self.state.record_not_found();
                None
            }
            Acquired::Cycle => {
                self.state.leave(current);
                warn!(
                    "Circular import of {} from {} skipped",
                    target.display(),
                    current.display()
                );
                self.state.record_cycle();
                return (
                    BundleNode::cyclic(target),
                    directive::diagnostic_marker(CIRCULAR_MARKER, &directive.text),
                );
            }
        };
        self.state.leave(current);

        let Some((node, content, count)) = outcome else {
            warn!("Import '{}' in {} could not be read", directive.path, current.display());
            return (
                BundleNode::not_found(target),
                directive::diagnostic_marker(NOT_FOUND_MARKER, &directive.text),
            );
        };

        if count > 1 && dedup.contains(&target) {
            debug!("Deduplicating {} (use #{})", target.display(), count);
            self.state.record_deduped();
            return (node.into_deduped(), String::new());
        }

        (node, content.to_string())
    }
}

/// Aborts the wrapped task when dropped, so a cancelled batch stops its
/// entries instead of leaving them running detached.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}
