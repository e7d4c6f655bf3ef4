use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use globpipe::{Step, StreamEntry};

/// A pass-through step that records the path sequence of every delivery it
/// sees.
///
/// Tests hand a clone to a pipeline stage and assert on `seen()` afterwards,
/// the same way a fake executor records scheduled work.
#[derive(Clone, Default)]
pub struct RecordingStep {
    seen: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl RecordingStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sequence of paths this step has been invoked with, in order.
    pub fn seen(&self) -> Vec<Vec<PathBuf>> {
        self.seen.lock().unwrap().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Step for RecordingStep {
    fn transform(&self, entries: Vec<StreamEntry>) -> Vec<StreamEntry> {
        let paths = entries.iter().map(|e| e.path().to_path_buf()).collect();
        self.seen.lock().unwrap().push(paths);
        entries
    }
}
