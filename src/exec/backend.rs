// src/exec/backend.rs

//! Pluggable executor backend.
//!
//! The runtime asks an [`ExecutorBackend`] to run one candidate at a time and
//! awaits the returned future. Production uses [`ProcessExecutor`]; tests
//! substitute a scripted backend that never touches the OS.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::ConfigFile;
use crate::engine::CancelSignal;
use crate::errors::Result;
use crate::model::{CandidateTest, ExecutionOutcome};

use super::command::RunnerPolicy;
use super::task_runner::run_candidate;

/// Future returned by [`ExecutorBackend::execute`].
///
/// Resolves to `None` when a stop was already requested by the time the
/// execution was first polled: the candidate never started and nothing is
/// recorded for it.
pub type OutcomeFuture = Pin<Box<dyn Future<Output = Option<ExecutionOutcome>> + Send + 'static>>;

/// Executes a single candidate.
///
/// Once started, implementations must always produce an outcome (failures to
/// start a process are `Errored` outcomes, not errors) and must honour
/// `cancel` by ending the execution promptly.
pub trait ExecutorBackend: Send + Sync + 'static {
    fn execute(&self, candidate: CandidateTest, timeout: Duration, cancel: CancelSignal) -> OutcomeFuture;
}

/// Runs candidates as real child processes.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    policy: Arc<RunnerPolicy>,
}

impl ProcessExecutor {
    pub fn new(policy: RunnerPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Ok(Self::new(RunnerPolicy::from_config(cfg)?))
    }

    /// Override the SIGTERM-to-SIGKILL grace period.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        Arc::make_mut(&mut self.policy).grace_period = grace;
        self
    }

    pub fn policy(&self) -> &RunnerPolicy {
        &self.policy
    }
}

impl ExecutorBackend for ProcessExecutor {
    fn execute(&self, candidate: CandidateTest, timeout: Duration, cancel: CancelSignal) -> OutcomeFuture {
        let policy = Arc::clone(&self.policy);
        Box::pin(async move {
            if cancel.is_cancelled() {
                debug!(test = %candidate.file_path, "stop requested before start; not spawning");
                return None;
            }
            Some(run_candidate(candidate, policy, timeout, cancel).await)
        })
    }
}
