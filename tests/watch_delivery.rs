// tests/watch_delivery.rs

//! End-to-end watch-session tests against a real filesystem and watcher.
//!
//! Every wait is bounded: a lost delivery fails the test instead of hanging
//! the suite.

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use globpipe::stream::PipelineSnapshot;
use globpipe::types::{ChangeKind, WatchOptions};
use globpipe::watch::ChannelPipeline;
use globpipe::{watch_with, SelectExt};
use globpipe_test_utils::builders::TempTree;
use globpipe_test_utils::recording::RecordingStep;

type TestResult = Result<(), Box<dyn Error>>;

fn watch_opts(tree: &TempTree) -> WatchOptions {
    WatchOptions {
        base: Some(tree.path().to_path_buf()),
        ..Default::default()
    }
}

fn snapshot_paths(snapshot: &PipelineSnapshot) -> Vec<PathBuf> {
    snapshot
        .entries()
        .iter()
        .map(|e| e.path().to_path_buf())
        .collect()
}

async fn next_snapshot(stream: &mut ChannelPipeline) -> PipelineSnapshot {
    tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("timed out waiting for a snapshot")
        .expect("snapshot channel closed unexpectedly")
}

/// Pull snapshots until one is annotated for `rel`.
///
/// Platforms differ in how many raw events a single filesystem operation
/// produces, so tests assert on the first delivery for the path they care
/// about rather than counting raw deliveries.
async fn snapshot_for(stream: &mut ChannelPipeline, rel: &str) -> PipelineSnapshot {
    loop {
        let snapshot = next_snapshot(stream).await;
        let hit = snapshot
            .changed()
            .is_some_and(|e| e.path() == Path::new(rel));
        if hit {
            return snapshot;
        }
    }
}

#[tokio::test]
async fn initial_snapshot_is_delivered_before_any_change() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new().with_file("a.js", "let a;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let initial = next_snapshot(&mut stream).await;
        assert_eq!(snapshot_paths(&initial), vec![PathBuf::from("a.js")]);
        assert!(initial.changed().is_none());

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn modifying_a_watched_file_delivers_an_annotated_snapshot() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new().with_file("a.js", "let a;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let initial = next_snapshot(&mut stream).await;
        assert!(initial.changed().is_none());

        tree.write("a.js", "let a = 2;");

        let snapshot = snapshot_for(&mut stream, "a.js").await;
        let event = snapshot.changed().unwrap().event().unwrap();
        assert_eq!(event.kind, ChangeKind::Modified);
        assert_eq!(snapshot.len(), 1);

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn multi_file_watch_preserves_snapshot_cardinality() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new()
            .with_file("a.js", "let a;")
            .with_file("b.js", "let b;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let initial = next_snapshot(&mut stream).await;
        assert_eq!(
            snapshot_paths(&initial),
            vec![PathBuf::from("a.js"), PathBuf::from("b.js")]
        );

        tree.write("b.js", "let b = 2;");

        let snapshot = snapshot_for(&mut stream, "b.js").await;
        // Both entries delivered, exactly one carrying the annotation.
        assert_eq!(snapshot.len(), 2);
        let annotated: Vec<_> = snapshot
            .entries()
            .iter()
            .filter(|e| e.event().is_some())
            .collect();
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].path(), Path::new("b.js"));
        assert_eq!(annotated[0].event().unwrap().kind, ChangeKind::Modified);

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn created_file_matching_patterns_is_admitted() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new().with_file("a.js", "let a;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let initial = next_snapshot(&mut stream).await;
        assert_eq!(initial.len(), 1);

        tree.write("c.js", "let c;");

        let snapshot = snapshot_for(&mut stream, "c.js").await;
        assert_eq!(
            snapshot_paths(&snapshot),
            vec![PathBuf::from("a.js"), PathBuf::from("c.js")]
        );
        assert_eq!(
            snapshot.changed().unwrap().event().unwrap().kind,
            ChangeKind::Created
        );

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn created_file_outside_patterns_is_ignored() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new().with_file("a.js", "let a;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let _initial = next_snapshot(&mut stream).await;

        // A non-matching neighbour appears, then a tracked file changes.
        tree.write("notes.txt", "scratch");
        tree.write("a.js", "let a = 2;");

        // The next delivery concerning anything must be the a.js change;
        // notes.txt never enters the index.
        let snapshot = snapshot_for(&mut stream, "a.js").await;
        assert_eq!(snapshot_paths(&snapshot), vec![PathBuf::from("a.js")]);

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn removed_file_is_delivered_annotated_then_dropped() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new()
            .with_file("a.js", "let a;")
            .with_file("b.js", "let b;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let _initial = next_snapshot(&mut stream).await;

        tree.remove("b.js");

        // The departing entry is still part of the snapshot that announces
        // its removal.
        let snapshot = snapshot_for(&mut stream, "b.js").await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.changed().unwrap().event().unwrap().kind,
            ChangeKind::Removed
        );

        // Afterwards the index has shrunk.
        tree.write("a.js", "let a = 2;");
        let snapshot = snapshot_for(&mut stream, "a.js").await;
        assert_eq!(snapshot_paths(&snapshot), vec![PathBuf::from("a.js")]);

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn rename_moves_tracking_to_the_new_path() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new().with_file("a.js", "let a;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let _initial = next_snapshot(&mut stream).await;

        tree.rename("a.js", "b.js");

        let snapshot = snapshot_for(&mut stream, "b.js").await;
        assert_eq!(
            snapshot.changed().unwrap().event().unwrap().kind,
            ChangeKind::Renamed
        );
        assert_eq!(snapshot_paths(&snapshot), vec![PathBuf::from("b.js")]);

        session.shutdown().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_closes_the_pipeline() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new().with_file("a.js", "let a;");
        let (session, mut stream) = watch_with(&["*.js"], watch_opts(&tree))?;

        let _initial = next_snapshot(&mut stream).await;

        session.shutdown().await;

        // Drain whatever was in flight; the channel must then close.
        loop {
            match tokio::time::timeout(Duration::from_secs(5), stream.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => panic!("channel did not close after shutdown"),
            }
        }

        stream.join().await;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn channel_stage_applies_step_to_every_delivery_in_order() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tree = TempTree::new()
            .with_file("a.js", "let a;")
            .with_file("style.css", "body {}");
        let (session, stream) = watch_with(&["*"], watch_opts(&tree))?;

        let recorder = RecordingStep::new();
        let mut stream = stream
            .apply(SelectExt::new("js"))
            .apply(recorder.clone());

        // Initial snapshot, post-filter.
        let initial = next_snapshot(&mut stream).await;
        assert_eq!(snapshot_paths(&initial), vec![PathBuf::from("a.js")]);

        tree.write("a.js", "let a = 2;");
        let snapshot = snapshot_for(&mut stream, "a.js").await;
        assert_eq!(snapshot_paths(&snapshot), vec![PathBuf::from("a.js")]);

        // The recorder sat after the filter, so every delivery it saw was
        // already narrowed, starting with the initial one.
        let seen = recorder.seen();
        assert!(!seen.is_empty());
        assert_eq!(seen[0], vec![PathBuf::from("a.js")]);
        assert!(seen.iter().all(|paths| paths == &vec![PathBuf::from("a.js")]));

        session.shutdown().await;
        stream.join().await;
        Ok(())
    })
    .await
}
