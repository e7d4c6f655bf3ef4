// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigFile, RawConfigFile};
use crate::errors::{GlobpipeError, Result};

/// Load a configuration file and return the raw, unvalidated form.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| GlobpipeError::io(path, e))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and run basic validation.
///
/// This is the entry point the CLI uses:
/// - reads TOML, applying defaults via `serde` + `Default` impls,
/// - checks that at least one pattern is configured,
/// - checks channel-capacity sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw)?;
    Ok(config)
}

/// Default config path: `Globpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Globpipe.toml")
}
