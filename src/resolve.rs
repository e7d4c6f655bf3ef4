// src/resolve.rs

//! Glob pattern resolution.
//!
//! Turns an ordered list of glob patterns into a deduplicated, deterministic
//! list of regular-file paths, relative to an explicit base directory.
//!
//! Resolution never touches the process working directory: the base is
//! threaded through as a parameter and joined onto each pattern before
//! expansion. The `glob` crate walks directory entries in sorted order, so
//! output is reproducible for identical filesystem state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{GlobpipeError, Result};

/// Expand `patterns` against `base` into relative file paths.
///
/// - Each pattern is expanded independently; zero matches is not an error.
/// - Matches are merged across patterns keyed by relative path,
///   first-seen-wins: a later pattern re-matching an already-seen path
///   neither duplicates nor reorders it.
/// - Matches that stat as directories are silently dropped.
/// - A malformed pattern, an unreadable match, or a stat failure aborts the
///   whole resolution with a typed error.
pub fn resolve_patterns<S: AsRef<str>>(base: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut resolved: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let full = base.join(pattern);

        let matches = glob::glob(&full.to_string_lossy()).map_err(|source| {
            GlobpipeError::Pattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        for entry in matches {
            let path = entry?;
            let meta = fs::metadata(&path).map_err(|e| GlobpipeError::io(&path, e))?;
            if meta.is_dir() {
                debug!(?path, "dropping directory match");
                continue;
            }

            let rel = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
            if seen.insert(rel.clone()) {
                resolved.push(rel);
            }
        }

        debug!(pattern, total = resolved.len(), "expanded pattern");
    }

    Ok(resolved)
}

/// Deduplicated parent directories of the given relative paths.
///
/// A file directly under the base maps to `"."` so the base itself gets
/// watched. Sorted order keeps subscription setup deterministic.
pub fn parent_dirs<'a, I>(paths: I) -> std::collections::BTreeSet<PathBuf>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    paths
        .into_iter()
        .map(|p| match p.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        })
        .collect()
}
