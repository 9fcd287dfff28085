// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds the `tokio::process::Command` for a candidate.
//! - [`task_runner`] runs one candidate: spawn, capture, timeout, stop.
//! - [`capture`] drains stdout/stderr into bounded tail buffers.
//! - [`terminate`] does graceful-then-forced process group termination.
//! - [`backend`] provides the `ExecutorBackend` trait the runtime talks to,
//!   and the production `ProcessExecutor`.

pub mod backend;
pub mod capture;
pub mod command;
pub mod task_runner;
pub mod terminate;

pub use backend::{ExecutorBackend, OutcomeFuture, ProcessExecutor};
pub use command::{CONTEXT_ENV_VAR, RunnerPolicy, build_command};
pub use task_runner::run_candidate;
