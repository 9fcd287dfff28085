// src/config/validate.rs

use std::collections::HashSet;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TestherdError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TestherdError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_run_section(cfg)?;
    validate_discovery(cfg)?;
    validate_runner(cfg)?;
    validate_report(cfg)?;
    validate_categories(cfg)?;
    Ok(())
}

/// Limits shared by the `[run]` section and CLI overrides.
pub fn validate_run_limits(max_concurrency: usize, timeout_ms: u64, threshold: u32) -> Result<()> {
    if max_concurrency == 0 {
        return Err(config_error("[run].max_concurrency must be >= 1 (got 0)"));
    }
    if timeout_ms == 0 {
        return Err(config_error("[run].timeout_ms must be > 0 (got 0)"));
    }
    if threshold > 100 {
        return Err(config_error(format!(
            "[run].acceptance_threshold must be within 0..=100 (got {threshold})"
        )));
    }
    Ok(())
}

fn validate_run_section(cfg: &RawConfigFile) -> Result<()> {
    validate_run_limits(
        cfg.run.max_concurrency,
        cfg.run.timeout_ms,
        cfg.run.acceptance_threshold,
    )
}

fn validate_discovery(cfg: &RawConfigFile) -> Result<()> {
    if cfg.discovery.patterns.is_empty() {
        return Err(config_error(
            "[discovery].patterns must contain at least one glob",
        ));
    }
    for pat in cfg.discovery.patterns.iter().chain(cfg.discovery.exclude.iter()) {
        Glob::new(pat)
            .map_err(|e| config_error(format!("invalid glob pattern '{pat}': {e}")))?;
    }
    if cfg.discovery.entry_markers.iter().all(|m| m.trim().is_empty()) {
        return Err(config_error(
            "[discovery].entry_markers must contain at least one non-empty marker",
        ));
    }
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.max_output_bytes == 0 {
        return Err(config_error("[runner].max_output_bytes must be > 0 (got 0)"));
    }
    for (ext, launcher) in cfg.runner.interpreters.iter() {
        if launcher.split_whitespace().next().is_none() {
            return Err(config_error(format!(
                "[runner.interpreters].{ext} must name a program"
            )));
        }
    }
    Ok(())
}

fn validate_report(cfg: &RawConfigFile) -> Result<()> {
    if cfg.report.formats.is_empty() {
        return Err(config_error("[report].formats must enable at least one format"));
    }
    let mut seen = HashSet::new();
    for fmt in cfg.report.formats.iter() {
        if !seen.insert(fmt) {
            return Err(config_error(format!(
                "[report].formats lists {fmt:?} more than once"
            )));
        }
    }
    Ok(())
}

fn validate_categories(cfg: &RawConfigFile) -> Result<()> {
    for (idx, rule) in cfg.category.iter().enumerate() {
        if rule.keyword.trim().is_empty() {
            return Err(config_error(format!(
                "[[category]] #{} has an empty keyword",
                idx + 1
            )));
        }
        if rule.name.trim().is_empty() {
            return Err(config_error(format!(
                "[[category]] with keyword '{}' has an empty name",
                rule.keyword
            )));
        }
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> TestherdError {
    TestherdError::ConfigError(msg.into())
}
