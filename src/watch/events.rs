// src/watch/events.rs

//! Classification and per-event processing for raw notify records.
//!
//! The multiplexer loop in [`super::multiplexer`] stays a thin shell; the
//! decisions (what kind of change is this, does it concern a tracked file,
//! how does the index mutate) live here.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::stream::PipelineSnapshot;
use crate::types::{ChangeEvent, ChangeKind};
use crate::watch::registry::{relativize, WatchRegistry};

/// Whether the multiplexer loop should keep consuming after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    /// The delivery channel is gone; there is no one left to deliver to.
    Stop,
}

/// Map a raw notify kind onto the engine's change taxonomy.
///
/// Access and catch-all kinds carry no membership or content change and are
/// discarded before correlation. A rename arrives as `Modify(Name(_))` with
/// one or both of the affected paths.
pub(crate) fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        _ => None,
    }
}

/// Process one raw notification end-to-end: classify, correlate against the
/// registry, apply the index mutation for the kind, and deliver a snapshot
/// per accepted path.
///
/// Called from the single multiplexer task only, so index mutations are
/// never concurrent and no two deliveries interleave.
pub(crate) async fn process_event(
    registry: &mut WatchRegistry,
    canon_base: &Path,
    event: &notify::Event,
    out_tx: &mpsc::Sender<PipelineSnapshot>,
) -> LoopControl {
    let kind = match classify(&event.kind) {
        Some(kind) => kind,
        None => return LoopControl::Continue,
    };

    if kind == ChangeKind::Renamed {
        return process_rename(registry, canon_base, &event.paths, out_tx).await;
    }

    for path in &event.paths {
        let rel = match relativize(canon_base, path) {
            Some(rel) => rel,
            None => {
                debug!(?path, "event path outside session base; discarding");
                continue;
            }
        };

        if !registry.is_relevant(&rel) {
            continue;
        }

        match kind {
            ChangeKind::Modified => {
                if !registry.is_tracked(&rel) {
                    continue;
                }
                let ev = ChangeEvent::new(ChangeKind::Modified, rel);
                if !deliver(registry, Some(&ev), out_tx).await {
                    return LoopControl::Stop;
                }
            }
            ChangeKind::Created => {
                if registry.is_tracked(&rel) {
                    // Truncate-rewrite editors emit Create for files we
                    // already track; the content still changed.
                    let ev = ChangeEvent::new(ChangeKind::Modified, rel);
                    if !deliver(registry, Some(&ev), out_tx).await {
                        return LoopControl::Stop;
                    }
                } else if registry.matches_pattern(&rel) {
                    if let Err(err) = registry.admit(rel.clone()) {
                        // The file may already be gone again; a transient
                        // create/remove race must not kill the session.
                        warn!(?rel, error = %err, "failed to open created file; discarding event");
                        continue;
                    }
                    let ev = ChangeEvent::new(ChangeKind::Created, rel);
                    if !deliver(registry, Some(&ev), out_tx).await {
                        return LoopControl::Stop;
                    }
                }
            }
            ChangeKind::Removed => {
                if !registry.is_tracked(&rel) {
                    continue;
                }
                // Deliver with the departing entry still present and
                // annotated, then drop it from the index.
                let ev = ChangeEvent::new(ChangeKind::Removed, rel.clone());
                if !deliver(registry, Some(&ev), out_tx).await {
                    return LoopControl::Stop;
                }
                registry.evict(&rel);
            }
            ChangeKind::Renamed => unreachable!("renames handled above"),
        }
    }

    LoopControl::Continue
}

/// Rename policy: remove the old-path entry; if the new path matches the
/// session's patterns, admit it and annotate it `Renamed`; otherwise the old
/// entry leaves annotated `Removed`. A rename touching only untracked paths
/// is discarded.
async fn process_rename(
    registry: &mut WatchRegistry,
    canon_base: &Path,
    paths: &[PathBuf],
    out_tx: &mpsc::Sender<PipelineSnapshot>,
) -> LoopControl {
    let rels: Vec<PathBuf> = paths
        .iter()
        .filter_map(|p| relativize(canon_base, p))
        .collect();

    let old = rels.iter().find(|r| registry.is_tracked(r)).cloned();
    let new = rels
        .iter()
        .find(|r| !registry.is_tracked(r) && registry.matches_pattern(r))
        .cloned();

    match (old, new) {
        (Some(old), Some(new)) => {
            if let Err(err) = registry.admit(new.clone()) {
                warn!(?new, error = %err, "failed to open rename target; treating as removal");
                return remove_and_deliver(registry, old, out_tx).await;
            }
            registry.evict(&old);
            let ev = ChangeEvent::new(ChangeKind::Renamed, new);
            if !deliver(registry, Some(&ev), out_tx).await {
                return LoopControl::Stop;
            }
            LoopControl::Continue
        }
        (Some(old), None) => remove_and_deliver(registry, old, out_tx).await,
        (None, Some(new)) => {
            if let Err(err) = registry.admit(new.clone()) {
                warn!(?new, error = %err, "failed to open rename target; discarding event");
                return LoopControl::Continue;
            }
            let ev = ChangeEvent::new(ChangeKind::Renamed, new);
            if !deliver(registry, Some(&ev), out_tx).await {
                return LoopControl::Stop;
            }
            LoopControl::Continue
        }
        (None, None) => LoopControl::Continue,
    }
}

async fn remove_and_deliver(
    registry: &mut WatchRegistry,
    old: PathBuf,
    out_tx: &mpsc::Sender<PipelineSnapshot>,
) -> LoopControl {
    let ev = ChangeEvent::new(ChangeKind::Removed, old.clone());
    if !deliver(registry, Some(&ev), out_tx).await {
        return LoopControl::Stop;
    }
    registry.evict(&old);
    LoopControl::Continue
}

/// Push one snapshot onto the bounded channel, waiting for capacity.
///
/// Backpressure, not loss: a slow consumer delays further event processing
/// rather than dropping deliveries. Returns false when the receiving side
/// is gone, in which case the loop has no reason to stay alive.
pub(crate) async fn deliver(
    registry: &WatchRegistry,
    changed: Option<&ChangeEvent>,
    out_tx: &mpsc::Sender<PipelineSnapshot>,
) -> bool {
    let snapshot = registry.snapshot(changed);
    debug!(len = snapshot.len(), changed = ?changed, "delivering snapshot");
    if out_tx.send(snapshot).await.is_err() {
        warn!("snapshot receiver dropped; stopping delivery");
        return false;
    }
    true
}
