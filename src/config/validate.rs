// src/config/validate.rs

use crate::config::{ConfigFile, RawConfigFile};
use crate::errors::{GlobpipeError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = GlobpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.source, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_patterns(cfg)?;
    validate_watch_section(cfg)?;
    Ok(())
}

fn ensure_has_patterns(cfg: &RawConfigFile) -> Result<()> {
    if cfg.source.patterns.is_empty() {
        return Err(GlobpipeError::ConfigError(
            "[source].patterns must contain at least one glob pattern".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.queue_depth == 0 {
        return Err(GlobpipeError::ConfigError(
            "[watch].queue_depth must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
