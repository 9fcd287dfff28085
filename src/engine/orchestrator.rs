// src/engine/orchestrator.rs

//! One orchestrator instance = one run at a time.
//!
//! [`Orchestrator::run`] goes through discovery, scheduling, aggregation and
//! report emission. A second `run` while one is in progress is rejected with
//! [`TestherdError::AlreadyRunning`] instead of interleaving state.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::{AggregateInput, CategoryRules, aggregate};
use crate::config::ConfigFile;
use crate::discovery;
use crate::errors::{Result, TestherdError};
use crate::exec::{ExecutorBackend, ProcessExecutor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::model::{AggregatedReport, CandidateTest};
use crate::report::{EmitSummary, LiveSnapshotObserver, emit_all, emitters_for};
use crate::types::ReportFormat;

use super::cancel::{StopHandle, stop_channel};
use super::runtime::Runtime;
use super::scheduler::WaveScheduler;
use super::{RunOptions, RunVerdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Running,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: AggregatedReport,
    pub verdict: RunVerdict,
    pub emitted: EmitSummary,
    pub waves: usize,
}

pub struct Orchestrator<E: ExecutorBackend> {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    executor: Arc<E>,
    state: Arc<Mutex<OrchestratorState>>,
    stop: StopHandle,
}

impl<E: ExecutorBackend> std::fmt::Debug for Orchestrator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state())
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl Orchestrator<ProcessExecutor> {
    /// Production wiring: real filesystem, real child processes.
    pub fn with_process_executor(config: ConfigFile) -> Result<Self> {
        let executor = ProcessExecutor::from_config(&config)?;
        Ok(Self::new(config, Arc::new(RealFileSystem), executor))
    }
}

impl<E: ExecutorBackend> Orchestrator<E> {
    pub fn new(config: ConfigFile, fs: Arc<dyn FileSystem>, executor: E) -> Self {
        let (stop, _signal) = stop_channel();
        Self {
            config,
            fs,
            executor: Arc::new(executor),
            state: Arc::new(Mutex::new(OrchestratorState::Idle)),
            stop,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Handle that stops the current run. Stopping while idle has no effect
    /// on the next run.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn discover(&self) -> Result<Vec<CandidateTest>> {
        Ok(discovery::discover(self.fs.as_ref(), &self.config.discovery)?)
    }

    /// Discover, run, aggregate and emit reports.
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
        options.validate()?;
        let _guard = RunningGuard::acquire(&self.state)?;
        self.stop.reset();

        let candidates = self.discover()?;
        self.execute(candidates, options).await
    }

    /// Like [`Self::run`] but with an explicit candidate list instead of
    /// discovery.
    pub async fn run_candidates(&self, candidates: Vec<CandidateTest>, options: RunOptions) -> Result<RunSummary> {
        options.validate()?;
        let _guard = RunningGuard::acquire(&self.state)?;
        self.stop.reset();

        self.execute(candidates, options).await
    }

    async fn execute(&self, candidates: Vec<CandidateTest>, options: RunOptions) -> Result<RunSummary> {
        let start_time = Utc::now();
        let discovered = candidates.len();
        let rules = CategoryRules::from_config(&self.config.category);
        let report_cfg = &self.config.report;

        if discovered == 0 {
            warn!(root = %self.config.discovery.root.display(), "no executable tests discovered");
        }

        let scheduler = WaveScheduler::new(candidates, options.mode(), options.continue_on_failure);
        let mut runtime = Runtime::new(
            scheduler,
            Arc::clone(&self.executor),
            options.timeout,
            self.stop.signal(),
        );
        if report_cfg.live_updates && report_cfg.formats.contains(&ReportFormat::Snapshot) {
            runtime.add_observer(Box::new(LiveSnapshotObserver::new(
                Arc::clone(&self.fs),
                report_cfg.results_dir.clone(),
                rules.clone(),
                discovered,
                start_time,
            )));
        }

        let record = runtime.run().await;
        let end_time = Utc::now();

        let report = aggregate(AggregateInput {
            outcomes: &record.outcomes,
            discovered_tests: discovered,
            start_time,
            end_time,
            stopped_early: record.halt.as_ref(),
            rules: &rules,
        });

        let emitters = emitters_for(&report_cfg.formats);
        let emitted = emit_all(self.fs.as_ref(), &report_cfg.results_dir, &report, &emitters);

        let verdict = RunVerdict::evaluate(&report.execution_summary, options.acceptance_threshold);
        info!(
            ?verdict,
            total = report.execution_summary.total_tests,
            passed = report.execution_summary.passed,
            success_rate = report.execution_summary.success_rate_percent,
            "run complete"
        );

        Ok(RunSummary {
            report,
            verdict,
            emitted,
            waves: record.waves,
        })
    }
}

/// Marks the orchestrator `Running` for its lifetime.
struct RunningGuard {
    state: Arc<Mutex<OrchestratorState>>,
}

impl RunningGuard {
    fn acquire(state: &Arc<Mutex<OrchestratorState>>) -> Result<Self> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == OrchestratorState::Running {
            return Err(TestherdError::AlreadyRunning);
        }
        *current = OrchestratorState::Running;
        Ok(Self {
            state: Arc::clone(state),
        })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = OrchestratorState::Idle;
    }
}
