//! Run-scoped shared state for the bundle engine.
//!
//! One [`BundleState`] is owned by a [`Bundler`](super::Bundler) and shared by
//! every entry it processes. It holds:
//!
//! - **File content cache**: path to final bundled text, write-once
//! - **Usage counter**: path to number of import encounters
//! - **Child-import cache**: path to the child nodes recorded at first bundling
//! - **Waiting edges**: which import each in-progress file is currently on,
//!   used for cycle detection
//!
//! # Slot Lifecycle
//!
//! A content slot moves from vacant to `Pending` when a task claims the path,
//! then to `Ready` (bundled) or `Unreadable` (read failed). Tasks reaching a
//! `Pending` slot wait on its `Notify` instead of reading the file again, so
//! every path is read at most once per run.
//!
//! All map operations are synchronous and never hold a guard across an
//! `.await`.
//!
//! # Cancellation
//!
//! A run dropped mid-flight can leave `Pending` slots behind with no owner.
//! Such a state must be discarded, never reused.

use super::node::BundleNode;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::debug;

#[derive(Debug)]
enum ContentSlot {
    /// A task is reading and bundling this file.
    Pending(Arc<Notify>),
    /// Final bundled content.
    Ready(Arc<str>),
    /// The file could not be read; every reference is treated as not found.
    Unreadable,
}

/// Result of asking for a file's content slot.
#[derive(Debug)]
pub(crate) enum Acquired {
    /// The caller now owns the slot and must `complete` or `fail` it.
    Claimed,
    Cached(Arc<str>),
    Unreadable,
    /// Waiting for the slot would close a cycle.
    Cycle,
}

/// Counters describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleStats {
    /// Distinct files read from disk.
    pub files_read: usize,
    /// Lookups answered from the content cache.
    pub cache_hits: usize,
    /// Imports (and entries) that did not resolve to a readable file.
    pub not_found: usize,
    /// Import occurrences elided as duplicates.
    pub deduped: usize,
    /// Imports skipped as circular.
    pub cycles: usize,
}

impl fmt::Display for BundleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) read, {} cache hit(s), {} not found, {} deduped, {} circular",
            self.files_read, self.cache_hits, self.not_found, self.deduped, self.cycles
        )
    }
}

#[derive(Debug, Default)]
pub struct BundleState {
    contents: DashMap<PathBuf, ContentSlot>,
    usage: DashMap<PathBuf, usize>,
    child_imports: DashMap<PathBuf, Vec<BundleNode>>,
    waiting_on: DashMap<PathBuf, PathBuf>,
    reads: DashMap<PathBuf, usize>,
    cache_hits: AtomicUsize,
    not_found: AtomicUsize,
    deduped: AtomicUsize,
    cycles: AtomicUsize,
}

impl BundleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `path`, returns its cached outcome, or waits for the task that
    /// owns it.
    ///
    /// `waiter` is the in-progress file asking on behalf of an import. It must
    /// already have registered its edge with [`enter`](Self::enter). Entry
    /// lookups pass `None` and are never reported as cycles.
    pub(crate) async fn acquire(&self, path: &Path, waiter: Option<&Path>) -> Acquired {
        loop {
            let notify = match self.contents.entry(path.to_path_buf()) {
                Entry::Occupied(entry) => match entry.get() {
                    ContentSlot::Ready(content) => {
                        self.cache_hits.fetch_add(1, Ordering::Relaxed);
                        return Acquired::Cached(Arc::clone(content));
                    }
                    ContentSlot::Unreadable => return Acquired::Unreadable,
                    ContentSlot::Pending(notify) => Arc::clone(notify),
                },
                Entry::Vacant(entry) => {
                    entry.insert(ContentSlot::Pending(Arc::new(Notify::new())));
                    return Acquired::Claimed;
                }
            };

            if let Some(current) = waiter {
                if self.creates_cycle(current, path) {
                    debug!(
                        "Import of {} from {} is circular",
                        path.display(),
                        current.display()
                    );
                    return Acquired::Cycle;
                }
            }

            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            // Re-check after registering so a completion in between is not missed.
            if self.is_pending(path) {
                debug!("Waiting for {} to finish bundling", path.display());
                notified.await;
            }
        }
    }

    /// Publishes the bundled content of a claimed path and wakes its waiters.
    ///
    /// When `counted` is set this bundling is itself an import encounter and the
    /// usage counter is bumped before the content becomes visible, so the
    /// owner always observes the first count. Returns the usage count.
    pub(crate) fn complete(
        &self,
        path: &Path,
        content: Arc<str>,
        imports: Vec<BundleNode>,
        counted: bool,
    ) -> usize {
        let count = if counted {
            self.record_use(path)
        } else {
            self.usage_count(path)
        };

        self.child_imports.insert(path.to_path_buf(), imports);
        let previous = self.contents.insert(path.to_path_buf(), ContentSlot::Ready(content));
        if let Some(ContentSlot::Pending(notify)) = previous {
            notify.notify_waiters();
        }

        count
    }

    /// Marks a claimed path as unreadable and wakes its waiters.
    pub(crate) fn fail(&self, path: &Path) {
        let previous = self.contents.insert(path.to_path_buf(), ContentSlot::Unreadable);
        if let Some(ContentSlot::Pending(notify)) = previous {
            notify.notify_waiters();
        }
    }

    /// Records that `current` is now resolving an import of `target`.
    pub(crate) fn enter(&self, current: &Path, target: &Path) {
        self.waiting_on.insert(current.to_path_buf(), target.to_path_buf());
    }

    pub(crate) fn leave(&self, current: &Path) {
        self.waiting_on.remove(current);
    }

    /// Follows waiting edges from `target`; reaching `current` means waiting
    /// on `target` would never finish.
    fn creates_cycle(&self, current: &Path, target: &Path) -> bool {
        let mut visited = HashSet::new();
        let mut next = Some(target.to_path_buf());

        while let Some(node) = next {
            if node == current {
                return true;
            }
            if !visited.insert(node.clone()) {
                return false;
            }
            next = self.waiting_on.get(&node).map(|edge| edge.value().clone());
        }

        false
    }

    fn is_pending(&self, path: &Path) -> bool {
        matches!(self.contents.get(path).as_deref(), Some(ContentSlot::Pending(_)))
    }

    /// Increments the usage counter of `path` and returns the new count.
    pub(crate) fn record_use(&self, path: &Path) -> usize {
        let mut count = self.usage.entry(path.to_path_buf()).or_insert(0);
        *count += 1;
        *count
    }

    pub(crate) fn record_read(&self, path: &Path) {
        *self.reads.entry(path.to_path_buf()).or_insert(0) += 1;
    }

    pub(crate) fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deduped(&self) {
        self.deduped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of import encounters of `path` so far.
    #[must_use]
    pub fn usage_count(&self, path: &Path) -> usize {
        self.usage.get(path).map_or(0, |count| *count)
    }

    /// Number of times `path` was read from disk.
    #[must_use]
    pub fn read_count(&self, path: &Path) -> usize {
        self.reads.get(path).map_or(0, |count| *count)
    }

    /// Final bundled content of `path`, if it has been published.
    #[must_use]
    pub fn cached_content(&self, path: &Path) -> Option<Arc<str>> {
        match self.contents.get(path).as_deref() {
            Some(ContentSlot::Ready(content)) => Some(Arc::clone(content)),
            _ => None,
        }
    }

    /// Child nodes recorded when `path` was first bundled.
    #[must_use]
    pub fn child_imports(&self, path: &Path) -> Vec<BundleNode> {
        self.child_imports.get(path).map(|imports| imports.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn stats(&self) -> BundleStats {
        BundleStats {
            files_read: self.reads.len(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            deduped: self.deduped.load(Ordering::Relaxed),
            cycles: self.cycles.load(Ordering::Relaxed),
        }
    }
}
