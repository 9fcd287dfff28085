// src/errors.rs

//! Errors surfaced to callers of the crate.
//!
//! Per-candidate failures never show up here: they are recorded as
//! [`ExecutionOutcome`](crate::model::ExecutionOutcome) data. Only
//! configuration problems, run conflicts and genuine internal failures are
//! surfaced as `TestherdError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestherdError {
    /// A config file or run option failed validation.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O failure: {0}")]
    IoError(#[from] std::io::Error),

    /// The config file is not valid TOML or has fields of the wrong type.
    #[error("malformed config file: {0}")]
    TomlError(#[from] toml::de::Error),

    /// `run()` was called on an orchestrator that is already running.
    #[error("a test run is already in progress on this orchestrator")]
    AlreadyRunning,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TestherdError>;
