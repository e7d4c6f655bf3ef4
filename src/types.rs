// src/types.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Default capacity of the snapshot delivery channel.
///
/// When the consumer lags behind, the multiplexer blocks on the full
/// channel instead of dropping snapshots.
pub const DEFAULT_QUEUE_DEPTH: usize = 5;

/// The kind of filesystem change observed on a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
}

/// A classified change on one tracked file.
///
/// Present on at most one entry of a delivered snapshot, for exactly that
/// delivery cycle. Index entries never carry an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Path of the affected file, relative to the resolution base.
    pub path: PathBuf,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Options for one-shot sourcing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceOptions {
    /// Base directory patterns are resolved against. Defaults to the
    /// current directory; the process working directory is never mutated.
    pub base: Option<PathBuf>,
}

/// Options for a watch session.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchOptions {
    pub base: Option<PathBuf>,
    /// Snapshot channel capacity; the producer blocks when it is full.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            base: None,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}
