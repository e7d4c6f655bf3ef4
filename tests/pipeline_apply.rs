// tests/pipeline_apply.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use globpipe::types::SourceOptions;
use globpipe::{source_with, PassThrough, SelectExt, StreamEntry};
use globpipe_test_utils::builders::TempTree;

type TestResult = Result<(), Box<dyn Error>>;

fn entry_paths(entries: &[StreamEntry]) -> Vec<PathBuf> {
    entries.iter().map(|e| e.path().to_path_buf()).collect()
}

fn base_opts(tree: &TempTree) -> SourceOptions {
    SourceOptions {
        base: Some(tree.path().to_path_buf()),
    }
}

#[test]
fn passthrough_preserves_order_and_cardinality() -> TestResult {
    init_tracing();

    let tree = TempTree::new()
        .with_file("a.js", "let a;")
        .with_file("b.js", "let b;");

    let pipeline = source_with(&["*.js"], base_opts(&tree))?;
    let before = entry_paths(pipeline.entries());

    let pipeline = pipeline.apply(&PassThrough);
    assert_eq!(entry_paths(pipeline.entries()), before);

    Ok(())
}

#[test]
fn select_ext_narrows_the_stream() -> TestResult {
    init_tracing();

    let tree = TempTree::new()
        .with_file("a.js", "let a;")
        .with_file("style.css", "body {}");

    let pipeline = source_with(&["*"], base_opts(&tree))?.apply(&SelectExt::new("js"));

    assert_eq!(
        entry_paths(pipeline.entries()),
        vec![PathBuf::from("a.js")]
    );

    Ok(())
}

#[test]
fn step_receives_the_full_sequence_at_once() -> TestResult {
    init_tracing();

    let tree = TempTree::new()
        .with_file("a.js", "let a;")
        .with_file("b.js", "let b;")
        .with_file("c.js", "let c;");

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_by_step = Arc::clone(&seen);

    let step = move |entries: Vec<StreamEntry>| {
        seen_by_step.lock().unwrap().push(entries.len());
        entries
    };

    let pipeline = source_with(&["*.js"], base_opts(&tree))?.apply(&step);

    // Exactly one invocation, with all three entries; no partial results.
    assert_eq!(*seen.lock().unwrap(), vec![3]);
    assert_eq!(pipeline.len(), 3);

    Ok(())
}

#[test]
fn chained_applies_compose_in_order() -> TestResult {
    init_tracing();

    let tree = TempTree::new()
        .with_file("a.js", "let a;")
        .with_file("b.txt", "b")
        .with_file("c.js", "let c;");

    let reverse = |mut entries: Vec<StreamEntry>| {
        entries.reverse();
        entries
    };

    let pipeline = source_with(&["*"], base_opts(&tree))?
        .apply(&SelectExt::new("js"))
        .apply(&reverse);

    assert_eq!(
        entry_paths(pipeline.entries()),
        vec![PathBuf::from("c.js"), PathBuf::from("a.js")]
    );

    Ok(())
}

#[test]
fn entries_expose_file_contents() -> TestResult {
    init_tracing();

    let tree = TempTree::new().with_file("a.js", "let a = 1;");

    let pipeline = source_with(&["a.js"], base_opts(&tree))?;
    let entry = &pipeline.entries()[0];

    assert_eq!(entry.contents()?, b"let a = 1;");
    // Reading twice is deterministic even though the handle is shared.
    assert_eq!(entry.contents()?, b"let a = 1;");

    Ok(())
}
