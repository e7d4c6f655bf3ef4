// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod resolve;
pub mod stream;
pub mod types;
pub mod watch;

use std::path::PathBuf;

use tracing::info;

use crate::cli::CliArgs;
use crate::errors::{GlobpipeError, Result};
use crate::stream::{open_entries, Pipeline, PipelineSnapshot};
use crate::types::{SourceOptions, WatchOptions};
use crate::watch::{spawn_multiplexer, ChannelPipeline, WatchSession};

pub use crate::stream::{PassThrough, SelectExt, Step, StreamEntry};
pub use crate::types::{ChangeEvent, ChangeKind, DEFAULT_QUEUE_DEPTH};

/// One-shot source: resolve `patterns` against the current directory and
/// open the matches into a pipeline.
pub fn source<S: AsRef<str>>(patterns: &[S]) -> Result<Pipeline> {
    source_with(patterns, SourceOptions::default())
}

/// One-shot source with explicit options.
///
/// The base directory is a parameter of the resolution; the process working
/// directory is never changed. Entries come back in resolver order: per
/// pattern lexicographic, patterns merged in argument order, first match of
/// a path wins.
pub fn source_with<S: AsRef<str>>(patterns: &[S], opts: SourceOptions) -> Result<Pipeline> {
    let base = opts.base.unwrap_or_else(|| PathBuf::from("."));
    let resolved = resolve::resolve_patterns(&base, patterns)?;
    let entries = open_entries(&base, resolved)?;
    Ok(Pipeline::new(entries))
}

/// Start a watch session over `patterns` with default options.
///
/// Must be called from within a Tokio runtime.
pub fn watch<S: AsRef<str>>(patterns: &[S]) -> Result<(WatchSession, ChannelPipeline)> {
    watch_with(patterns, WatchOptions::default())
}

/// Start a watch session with explicit options.
pub fn watch_with<S: AsRef<str>>(
    patterns: &[S],
    opts: WatchOptions,
) -> Result<(WatchSession, ChannelPipeline)> {
    spawn_multiplexer(patterns, opts)
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config or CLI pattern selection
/// - one-shot sourcing (default) or a watch session (`--watch`)
/// - Ctrl-C handling for watch mode
pub async fn run(args: CliArgs) -> Result<()> {
    let (patterns, source_opts, watch_opts) = resolve_args(&args)?;

    if !args.watch {
        let pipeline = source_with(&patterns, source_opts)?;
        for entry in pipeline.entries() {
            println!("{}", entry.path().display());
        }
        return Ok(());
    }

    let (session, mut stream) = watch_with(&patterns, watch_opts)?;
    info!("watching {} pattern(s); Ctrl-C to stop", patterns.len());

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                }
                break;
            }
            snapshot = stream.recv() => {
                match snapshot {
                    Some(snapshot) => print_snapshot(&snapshot),
                    None => break,
                }
            }
        }
    }

    session.shutdown().await;
    stream.join().await;
    Ok(())
}

/// Merge CLI flags and (optional) config file into effective settings.
///
/// Flags override the config where both are given.
fn resolve_args(args: &CliArgs) -> Result<(Vec<String>, SourceOptions, WatchOptions)> {
    let (patterns, mut source_opts, mut watch_opts) = match &args.config {
        Some(path) => {
            let cfg = config::load_and_validate(path)?;
            (
                cfg.source.patterns.clone(),
                cfg.source_options(),
                cfg.watch_options(),
            )
        }
        None => {
            if args.patterns.is_empty() {
                return Err(GlobpipeError::ConfigError(
                    "no patterns given (pass patterns as arguments or use --config)".to_string(),
                ));
            }
            (
                args.patterns.clone(),
                SourceOptions::default(),
                WatchOptions::default(),
            )
        }
    };

    if let Some(base) = &args.base {
        source_opts.base = Some(base.clone());
        watch_opts.base = Some(base.clone());
    }
    if let Some(depth) = args.queue_depth {
        if depth == 0 {
            return Err(GlobpipeError::ConfigError(
                "--queue-depth must be >= 1 (got 0)".to_string(),
            ));
        }
        watch_opts.queue_depth = depth;
    }

    Ok((patterns, source_opts, watch_opts))
}

fn print_snapshot(snapshot: &PipelineSnapshot) {
    match snapshot.changed() {
        Some(entry) => {
            let ev = entry.event().expect("changed entry carries an event");
            println!(
                "[{} files] {:?} {}",
                snapshot.len(),
                ev.kind,
                ev.path.display()
            );
        }
        None => println!("[{} files] initial", snapshot.len()),
    }
}
