// src/errors.rs

//! Crate-wide error type and `Result` alias.
//!
//! Resolution-time failures (bad pattern, stat/open failure) abort the
//! `source`/`watch` call that caused them and are returned to the caller.
//! Nothing in this crate terminates the process on an ordinary I/O error.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobpipeError {
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read glob match: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("watch subscription error: {0}")]
    Subscribe(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlobpipeError {
    /// Wrap an `io::Error` together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GlobpipeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GlobpipeError>;
