// src/logging.rs

//! Logging setup for the `globpipe` binary using `tracing` +
//! `tracing-subscriber`.
//!
//! Level selection: the `--log-level` flag wins, then the `GLOBPIPE_LOG`
//! environment variable, then `info`. Logs go to STDERR so stdout stays
//! free for resolved paths and snapshot output.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_max_level(effective_level(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn effective_level(cli_level: Option<LogLevel>) -> Level {
    if let Some(lvl) = cli_level {
        return match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        };
    }

    std::env::var("GLOBPIPE_LOG")
        .ok()
        .and_then(|s| s.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}
