// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag here is optional: anything not given on the command line falls
//! back to the `[run]` / `[report]` sections of the config file, which in turn
//! fall back to built-in defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `testherd`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testherd",
    version,
    about = "Discover standalone test programs, run them under timeout and concurrency policy, and report.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Testherd.toml` in the current working directory. A missing
    /// default file means built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run candidates in bounded-parallel waves instead of one at a time.
    #[arg(long)]
    pub parallel: bool,

    /// Maximum number of test processes per wave (parallel mode only).
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Per-test wall-clock timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Stop scheduling as soon as a test does not pass.
    #[arg(long)]
    pub stop_on_failure: bool,

    /// Minimum overall success rate (percent) for the run to count as accepted.
    #[arg(long, value_name = "PERCENT")]
    pub threshold: Option<u32>,

    /// Directory the report artifacts are written to.
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTHERD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Discover and classify candidates, print them, but run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
