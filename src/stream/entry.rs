// src/stream/entry.rs

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{GlobpipeError, Result};
use crate::types::ChangeEvent;

/// One file within a pipeline.
///
/// The relative `path` is the entry's identity for its whole lifetime: it is
/// the dedup key during resolution and the correlation key for watch events.
/// The open handle is shared behind an `Arc`, so cloning an entry (e.g. into
/// a snapshot) is cheap and the underlying descriptor closes once the last
/// clone is dropped.
#[derive(Clone)]
pub struct StreamEntry {
    path: PathBuf,
    handle: Arc<File>,
    event: Option<ChangeEvent>,
}

impl fmt::Debug for StreamEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEntry")
            .field("path", &self.path)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

impl StreamEntry {
    /// Open the file at `base.join(rel)` into a new entry.
    ///
    /// An open failure is a fatal resolution error, same taxonomy as a stat
    /// failure during pattern expansion.
    pub fn open(base: &Path, rel: impl Into<PathBuf>) -> Result<Self> {
        let rel = rel.into();
        let abs = base.join(&rel);
        let file = File::open(&abs).map_err(|e| GlobpipeError::io(abs, e))?;
        Ok(Self {
            path: rel,
            handle: Arc::new(file),
            event: None,
        })
    }

    /// Path of this entry, relative to the resolution base.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The change that triggered the current delivery cycle, if this entry
    /// was the one affected.
    pub fn event(&self) -> Option<&ChangeEvent> {
        self.event.as_ref()
    }

    /// Clone of this entry carrying the given change annotation.
    ///
    /// Only snapshot copies are ever annotated; the index keeps the
    /// un-annotated original, which is how "cleared after delivery" holds.
    pub(crate) fn annotated(&self, event: ChangeEvent) -> StreamEntry {
        StreamEntry {
            path: self.path.clone(),
            handle: Arc::clone(&self.handle),
            event: Some(event),
        }
    }

    /// Read the whole file through the shared handle.
    ///
    /// The handle's cursor is shared between clones, so this seeks back to
    /// the start first to stay deterministic.
    pub fn contents(&self) -> io::Result<Vec<u8>> {
        let mut file = &*self.handle;
        file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Open every resolved path into a stream entry, preserving resolver order.
pub fn open_entries(base: &Path, resolved: Vec<PathBuf>) -> Result<Vec<StreamEntry>> {
    resolved
        .into_iter()
        .map(|rel| StreamEntry::open(base, rel))
        .collect()
}
