#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Builder for temporary directory trees used as resolution bases in tests.
///
/// The directory and everything in it is deleted when the `TempTree` drops.
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Create a file (and any missing parent directories) with the given
    /// contents.
    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        self.write(rel, contents);
        self
    }

    /// Create an empty directory.
    pub fn with_dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.dir.path().join(rel)).expect("failed to create dir");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write (or overwrite) a file mid-test, e.g. to trigger a watch event.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, contents).expect("failed to write file");
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.dir.path().join(rel)).expect("failed to remove file");
    }

    pub fn rename(&self, from: &str, to: &str) {
        fs::rename(self.dir.path().join(from), self.dir.path().join(to))
            .expect("failed to rename file");
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}
