// src/watch/channel.rs

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::stream::{PipelineSnapshot, Step};

/// The concurrent analogue of [`crate::stream::Pipeline`].
///
/// Each `apply` spawns one background stage that pulls snapshots from its
/// input channel, runs the step, and republishes on a new bounded channel
/// of the same depth. Chained applies form a strictly linear pipeline of
/// stages; every stage processes one snapshot fully before pulling the
/// next, so delivery order is preserved end-to-end.
///
/// Stages exit when their input channel closes, which cascades from the
/// multiplexer outward on shutdown.
pub struct ChannelPipeline {
    rx: mpsc::Receiver<PipelineSnapshot>,
    queue_depth: usize,
    stages: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for ChannelPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelPipeline")
            .field("queue_depth", &self.queue_depth)
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}

impl ChannelPipeline {
    pub(crate) fn new(rx: mpsc::Receiver<PipelineSnapshot>, queue_depth: usize) -> Self {
        Self {
            rx,
            queue_depth,
            stages: Vec::new(),
        }
    }

    /// Chain a stage: spawn a worker that applies `step` to every snapshot
    /// and returns a pipeline reading the worker's output.
    pub fn apply<S>(mut self, step: S) -> ChannelPipeline
    where
        S: Step + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let mut in_rx = self.rx;

        let handle = tokio::spawn(async move {
            while let Some(snapshot) = in_rx.recv().await {
                let out = PipelineSnapshot::new(step.transform(snapshot.into_entries()));
                if tx.send(out).await.is_err() {
                    debug!("stage output receiver dropped; exiting");
                    break;
                }
            }
            debug!("stage input closed; exiting");
        });

        self.stages.push(handle);
        ChannelPipeline {
            rx,
            queue_depth: self.queue_depth,
            stages: self.stages,
        }
    }

    /// Pull the next snapshot in delivery order.
    ///
    /// Returns `None` once the session has shut down and every in-flight
    /// snapshot has been consumed.
    pub async fn recv(&mut self) -> Option<PipelineSnapshot> {
        self.rx.recv().await
    }

    /// Wait for every stage task to exit.
    ///
    /// Dropping the receiver here unblocks the last stage if it is parked
    /// on a full output channel.
    pub async fn join(self) {
        drop(self.rx);
        for stage in self.stages {
            let _ = stage.await;
        }
    }
}
