// src/stream/steps.rs

//! Small built-in steps.
//!
//! Real transformation logic is supplied by callers; these exist for wiring
//! pipelines together and as reference implementations of the [`Step`]
//! trait with explicit configuration structs.

use super::entry::StreamEntry;
use super::pipeline::Step;

/// Forwards every entry unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Step for PassThrough {
    fn transform(&self, entries: Vec<StreamEntry>) -> Vec<StreamEntry> {
        entries
    }
}

/// Keeps only entries whose path has the configured extension.
#[derive(Debug, Clone)]
pub struct SelectExt {
    ext: String,
}

impl SelectExt {
    /// `ext` is matched without a leading dot, e.g. `SelectExt::new("js")`.
    pub fn new(ext: impl Into<String>) -> Self {
        Self { ext: ext.into() }
    }
}

impl Step for SelectExt {
    fn transform(&self, entries: Vec<StreamEntry>) -> Vec<StreamEntry> {
        entries
            .into_iter()
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext == self.ext.as_str())
            })
            .collect()
    }
}
