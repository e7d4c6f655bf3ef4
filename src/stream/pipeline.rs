// src/stream/pipeline.rs

use std::fmt;

use super::entry::StreamEntry;

/// A transformation step over an ordered sequence of stream entries.
///
/// Steps may filter, reorder, or pass entries through unchanged; whatever a
/// step returns becomes the new pipeline state. The engine imposes no
/// constraint on output cardinality or order.
///
/// Closures of the matching shape implement `Step` via a blanket impl, but
/// steps that carry configuration should be plain structs (see
/// [`super::steps`]) so their dependencies are explicit.
pub trait Step: Send + Sync {
    fn transform(&self, entries: Vec<StreamEntry>) -> Vec<StreamEntry>;
}

impl<F> Step for F
where
    F: Fn(Vec<StreamEntry>) -> Vec<StreamEntry> + Send + Sync,
{
    fn transform(&self, entries: Vec<StreamEntry>) -> Vec<StreamEntry> {
        self(entries)
    }
}

/// Value-style pipeline over a fixed set of entries.
///
/// Composition is synchronous and total: `apply` hands the step the full
/// ordered sequence and returns only after the step completes.
#[derive(Debug, Default)]
pub struct Pipeline {
    entries: Vec<StreamEntry>,
}

impl Pipeline {
    pub fn new(entries: Vec<StreamEntry>) -> Self {
        Self { entries }
    }

    /// Apply `step` to the current entries, producing a new pipeline
    /// wrapping exactly what the step returned.
    pub fn apply<S: Step + ?Sized>(self, step: &S) -> Pipeline {
        Pipeline {
            entries: step.transform(self.entries),
        }
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<StreamEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All currently tracked entries, delivered together on one watch cycle.
///
/// At most one entry carries a change annotation: the one whose filesystem
/// event triggered this delivery. The initial snapshot of a session carries
/// none.
#[derive(Clone, Default)]
pub struct PipelineSnapshot {
    entries: Vec<StreamEntry>,
}

impl fmt::Debug for PipelineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineSnapshot")
            .field("len", &self.entries.len())
            .field("changed", &self.changed().map(|e| e.path()))
            .finish()
    }
}

impl PipelineSnapshot {
    pub fn new(entries: Vec<StreamEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<StreamEntry> {
        self.entries
    }

    /// The entry whose change triggered this delivery, if any.
    pub fn changed(&self) -> Option<&StreamEntry> {
        self.entries.iter().find(|e| e.event().is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
