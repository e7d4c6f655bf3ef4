// src/watch/registry.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::Result;
use crate::resolve::{parent_dirs, resolve_patterns};
use crate::stream::{PipelineSnapshot, StreamEntry};
use crate::types::ChangeEvent;

/// The authoritative record of what a watch session tracks.
///
/// Holds the path → entry index seeded from pattern resolution, the
/// deduplicated parent directories to subscribe to, and a compiled matcher
/// over the original patterns so files created or renamed into a watched
/// directory can be admitted later.
///
/// Only the multiplexer task mutates the registry; it is moved into that
/// task at spawn, so single-writer discipline is enforced by ownership.
pub struct WatchRegistry {
    base: PathBuf,
    matcher: GlobSet,
    dirs: BTreeSet<PathBuf>,
    index: BTreeMap<PathBuf, StreamEntry>,
}

impl std::fmt::Debug for WatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("base", &self.base)
            .field("dirs", &self.dirs)
            .field("tracked", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl WatchRegistry {
    /// Resolve `patterns` against `base`, open every matched file, and
    /// derive the directory set to subscribe to.
    pub fn new<S: AsRef<str>>(base: impl Into<PathBuf>, patterns: &[S]) -> Result<Self> {
        let base = base.into();
        let resolved = resolve_patterns(&base, patterns)?;
        let dirs = parent_dirs(resolved.iter());
        let matcher = build_matcher(patterns)?;

        let mut index = BTreeMap::new();
        for rel in resolved {
            let entry = StreamEntry::open(&base, rel.clone())?;
            index.insert(rel, entry);
        }

        debug!(tracked = index.len(), dirs = dirs.len(), "registry seeded");

        Ok(Self {
            base,
            matcher,
            dirs,
            index,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directories to subscribe to, joined onto the base.
    pub fn watch_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.dirs.iter().map(|d| self.base.join(d))
    }

    /// Coarse membership test for an incoming event path: either the exact
    /// file is tracked, or its parent directory is watched territory (so
    /// same-directory collateral events get a closer look instead of being
    /// dropped outright).
    pub fn is_relevant(&self, rel: &Path) -> bool {
        if self.index.contains_key(rel) {
            return true;
        }
        match rel.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => self.dirs.contains(dir),
            _ => self.dirs.contains(Path::new(".")),
        }
    }

    pub fn is_tracked(&self, rel: &Path) -> bool {
        self.index.contains_key(rel)
    }

    /// Whether an untracked path matches the session's original patterns,
    /// i.e. whether a create/rename should admit it.
    pub fn matches_pattern(&self, rel: &Path) -> bool {
        self.matcher.is_match(rel)
    }

    /// Open `rel` and add it to the index.
    pub fn admit(&mut self, rel: PathBuf) -> Result<()> {
        let entry = StreamEntry::open(&self.base, rel.clone())?;
        debug!(?rel, "admitting new entry");
        self.index.insert(rel, entry);
        Ok(())
    }

    /// Drop `rel` from the index. The entry's handle closes once the last
    /// snapshot clone referencing it is gone.
    pub fn evict(&mut self, rel: &Path) -> Option<StreamEntry> {
        let removed = self.index.remove(rel);
        if removed.is_some() {
            debug!(?rel, "evicted entry");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Materialize a snapshot of all tracked entries in sorted path order,
    /// annotating the one named by `changed` (if it is still tracked).
    ///
    /// The index entries themselves are never annotated; only the clones in
    /// the snapshot carry the event, so it is gone once the snapshot is.
    pub fn snapshot(&self, changed: Option<&ChangeEvent>) -> PipelineSnapshot {
        let entries = self
            .index
            .values()
            .map(|entry| match changed {
                Some(ev) if ev.path == entry.path() => entry.annotated(ev.clone()),
                _ => entry.clone(),
            })
            .collect();
        PipelineSnapshot::new(entries)
    }
}

/// Compile the raw pattern strings into a single matcher.
fn build_matcher<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let pat = pat.as_ref();
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build().context("building pattern matcher")?)
}

/// Relate an event path back to the session base as a relative path.
///
/// Tries a direct `strip_prefix` first; if the prefixes disagree (symlinked
/// bases, platform path aliasing), canonicalizes both sides and retries.
/// Returns `None` when the path cannot be related to the base at all, which
/// the caller treats as a correlation miss.
pub(crate) fn relativize(root: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_path_buf());
        }
    }

    None
}
