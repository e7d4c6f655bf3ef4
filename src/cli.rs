// src/cli.rs

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for the `globpipe` demo binary.
#[derive(Debug, Parser)]
#[command(
    name = "globpipe",
    about = "Resolve glob patterns into a file stream, optionally re-delivering on change"
)]
pub struct CliArgs {
    /// Glob patterns to resolve.
    pub patterns: Vec<String>,

    /// Read patterns and options from a TOML config file instead.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base directory patterns are resolved against (default: current directory).
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Keep watching the matched files and print each delivered snapshot.
    #[arg(long)]
    pub watch: bool,

    /// Snapshot channel capacity in watch mode.
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// Log level. Falls back to the GLOBPIPE_LOG env var, then "info".
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
