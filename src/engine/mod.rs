// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the pure wave scheduler ([`scheduler`])
//! - the async shell that runs waves on an executor ([`runtime`])
//! - stop requests ([`cancel`])
//! - the per-instance run lifecycle and verdict ([`orchestrator`])

use std::time::Duration;

use serde::Serialize;

use crate::config::{RunSection, validate_run_limits};
use crate::errors::Result;
use crate::model::ExecutionSummary;
use crate::types::ScheduleMode;

pub mod cancel;
pub mod orchestrator;
pub mod runtime;
pub mod scheduler;

pub use cancel::{CancelSignal, StopHandle, stop_channel};
pub use orchestrator::{Orchestrator, OrchestratorState, RunSummary};
pub use runtime::{RunObserver, RunRecord, Runtime};
pub use scheduler::WaveScheduler;

/// Options for one run. Built from `[run]`, optionally overridden by CLI
/// flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub parallel: bool,
    pub max_concurrency: usize,
    pub timeout: Duration,
    pub continue_on_failure: bool,
    /// Minimum success rate (percent) for a run with failures to be accepted.
    pub acceptance_threshold: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_section(&RunSection::default())
    }
}

impl RunOptions {
    pub fn from_section(run: &RunSection) -> Self {
        Self {
            parallel: run.parallel,
            max_concurrency: run.max_concurrency,
            timeout: Duration::from_millis(run.timeout_ms),
            continue_on_failure: run.continue_on_failure,
            acceptance_threshold: run.acceptance_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_run_limits(
            self.max_concurrency,
            self.timeout.as_millis() as u64,
            self.acceptance_threshold,
        )
    }

    pub fn mode(&self) -> ScheduleMode {
        if self.parallel {
            ScheduleMode::Parallel {
                max_concurrency: self.max_concurrency,
            }
        } else {
            ScheduleMode::Sequential
        }
    }
}

/// Final classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum RunVerdict {
    NoTestsDiscovered,
    AllPassed,
    /// Some tests did not pass, but the success rate meets the threshold.
    #[serde(rename_all = "camelCase")]
    Accepted { success_rate: u32 },
    #[serde(rename_all = "camelCase")]
    BelowThreshold { success_rate: u32, threshold: u32 },
}

impl RunVerdict {
    pub fn evaluate(summary: &ExecutionSummary, threshold: u32) -> Self {
        if summary.discovered_tests == 0 {
            return RunVerdict::NoTestsDiscovered;
        }
        let success_rate = summary.success_rate_percent;
        if summary.total_tests > 0 && summary.passed == summary.total_tests {
            RunVerdict::AllPassed
        } else if success_rate >= threshold {
            RunVerdict::Accepted { success_rate }
        } else {
            RunVerdict::BelowThreshold {
                success_rate,
                threshold,
            }
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, RunVerdict::AllPassed | RunVerdict::Accepted { .. })
    }
}
