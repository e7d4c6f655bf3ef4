// src/config/mod.rs

//! TOML configuration for the demo front end.
//!
//! ```toml
//! [source]
//! patterns = ["src/*.js", "vendor/*.js"]
//! base = "."
//!
//! [watch]
//! queue_depth = 5
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{SourceOptions, WatchOptions, DEFAULT_QUEUE_DEPTH};

pub mod loader;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};

/// Raw deserialized config, prior to semantic validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub watch: WatchSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceSection {
    #[serde(default)]
    pub patterns: Vec<String>,
    pub base: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

/// Validated configuration. Construct via `TryFrom<RawConfigFile>` (see
/// [`validate`]) or [`load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub source: SourceSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(source: SourceSection, watch: WatchSection) -> Self {
        Self { source, watch }
    }

    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            base: self.source.base.clone(),
        }
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            base: self.source.base.clone(),
            queue_depth: self.watch.queue_depth,
        }
    }
}
