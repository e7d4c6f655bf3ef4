// src/watch/multiplexer.rs

use std::path::PathBuf;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::types::WatchOptions;
use crate::watch::channel::ChannelPipeline;
use crate::watch::events::{process_event, LoopControl};
use crate::watch::registry::WatchRegistry;

/// Teardown handle for a watch session.
///
/// Keeps the underlying `RecommendedWatcher` alive for the lifetime of the
/// session; [`WatchSession::shutdown`] drops it (releasing every directory
/// watch) and waits for the multiplexer task to exit before returning.
/// Dropping the session without calling `shutdown` tears everything down
/// too, just without the completion guarantee.
pub struct WatchSession {
    shutdown_tx: watch::Sender<bool>,
    watcher: Option<RecommendedWatcher>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession").finish_non_exhaustive()
    }
}

impl WatchSession {
    /// Signal the multiplexer to stop, release the notification
    /// subscription, and wait until the task has exited.
    ///
    /// Downstream pipeline stages drain on their own: once the multiplexer
    /// drops its sender, each stage sees its input close and exits in turn
    /// (awaitable via [`ChannelPipeline::join`]).
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        // Release the directory watches before waiting on the loop.
        self.watcher.take();
        if let Err(err) = self.task.await {
            warn!(error = %err, "multiplexer task did not exit cleanly");
        }
        info!("watch session shut down");
    }
}

/// Start a watch session over `patterns`.
///
/// Resolves the patterns, seeds the registry, subscribes to every watched
/// directory, and spawns the multiplexer task. The task delivers one
/// initial snapshot of the seeded membership, then one snapshot per
/// accepted change event, over a channel of `opts.queue_depth` capacity.
///
/// Must be called from within a Tokio runtime. Failing to establish the
/// notification subscription is the one setup error specific to watching;
/// it aborts the call with [`crate::errors::GlobpipeError::Subscribe`].
pub fn spawn_multiplexer<S: AsRef<str>>(
    patterns: &[S],
    opts: WatchOptions,
) -> Result<(WatchSession, ChannelPipeline)> {
    let base = opts.base.clone().unwrap_or_else(|| PathBuf::from("."));
    let registry = WatchRegistry::new(base.clone(), patterns)?;

    // Canonicalize once so event paths relate to a stable prefix.
    let canon_base = base.canonicalize().unwrap_or_else(|_| base.clone());

    // Channel from the blocking notify callback into the async world.
    // Errors are forwarded too, so they get logged by the loop instead of
    // killing the session.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = raw_tx.send(res);
        },
        Config::default(),
    )?;

    for dir in registry.watch_dirs() {
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    }

    info!(
        tracked = registry.len(),
        base = ?canon_base,
        "watch session started"
    );

    let (snap_tx, snap_rx) = mpsc::channel(opts.queue_depth);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut registry = registry;

        // Initial membership snapshot, before any change is observed.
        if snap_tx.send(registry.snapshot(None)).await.is_err() {
            debug!("snapshot receiver dropped before initial delivery");
            return;
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("shutdown requested");
                    break;
                }
                raw = raw_rx.recv() => {
                    match raw {
                        Some(Ok(event)) => {
                            debug!(?event, "received notify event");
                            if process_event(&mut registry, &canon_base, &event, &snap_tx).await
                                == LoopControl::Stop
                            {
                                break;
                            }
                        }
                        Some(Err(err)) => {
                            // A malformed notification must not kill a
                            // long-running session.
                            warn!(error = %err, "file watch error; continuing");
                        }
                        None => {
                            debug!("watcher dropped; event stream closed");
                            break;
                        }
                    }
                }
            }
        }

        debug!("multiplexer loop finished");
    });

    let pipeline = ChannelPipeline::new(snap_rx, opts.queue_depth);
    let session = WatchSession {
        shutdown_tx,
        watcher: Some(watcher),
        task,
    };

    Ok((session, pipeline))
}
