// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::exec::ExecutorBackend;
use crate::model::{CandidateTest, ExecutionOutcome, HaltReason};
use crate::parse::parse_outcome;

use super::cancel::CancelSignal;
use super::scheduler::WaveScheduler;

/// Hook notified while a run progresses.
///
/// Both methods default to no-ops so observers only implement what they
/// care about.
pub trait RunObserver: Send {
    /// Called once per outcome, in recorded (completion) order.
    fn on_outcome(&mut self, _outcome: &ExecutionOutcome) {}

    /// Called after every finished wave with all outcomes recorded so far.
    fn on_wave_finished(&mut self, _wave: usize, _outcomes: &[ExecutionOutcome]) {}
}

/// What the runtime hands back once scheduling is over.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub outcomes: Vec<ExecutionOutcome>,
    pub waves: usize,
    pub halt: Option<HaltReason>,
}

/// Drives a [`WaveScheduler`] and delegates each candidate to an
/// [`ExecutorBackend`].
///
/// The scheduler owns every decision about what runs next; this shell only
/// starts waves, waits for them and reports back.
pub struct Runtime<E: ExecutorBackend> {
    scheduler: WaveScheduler,
    executor: Arc<E>,
    timeout: Duration,
    cancel: CancelSignal,
    observers: Vec<Box<dyn RunObserver>>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .field("timeout", &self.timeout)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(scheduler: WaveScheduler, executor: Arc<E>, timeout: Duration, cancel: CancelSignal) -> Self {
        Self {
            scheduler,
            executor,
            timeout,
            cancel,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn RunObserver>) {
        self.observers.push(observer);
    }

    /// Run waves until the scheduler is exhausted or halted.
    ///
    /// A stop request is checked before every wave; a wave already in flight
    /// is cancelled through the executors' [`CancelSignal`] and its outcomes
    /// are still recorded.
    pub async fn run(mut self) -> RunRecord {
        let mut outcomes: Vec<ExecutionOutcome> = Vec::new();
        let mut waves = 0usize;

        info!(
            mode = ?self.scheduler.mode(),
            candidates = self.scheduler.remaining(),
            timeout_ms = self.timeout.as_millis() as u64,
            "test run started"
        );

        loop {
            if self.cancel.is_cancelled() {
                self.scheduler.cancel();
            }
            let Some(wave) = self.scheduler.next_wave() else {
                break;
            };
            waves += 1;

            let wave_outcomes = self.run_wave(waves, wave).await;

            // A stop during the wave wins over a failure it caused.
            if self.cancel.is_cancelled() {
                self.scheduler.cancel();
            }
            self.scheduler.record_wave(&wave_outcomes);

            outcomes.extend(wave_outcomes);
            for observer in &mut self.observers {
                observer.on_wave_finished(waves, &outcomes);
            }
        }

        let halt = self.scheduler.into_halt_reason();
        match &halt {
            Some(reason) => info!(?reason, recorded = outcomes.len(), waves, "test run halted early"),
            None => info!(recorded = outcomes.len(), waves, "test run finished"),
        }

        RunRecord { outcomes, waves, halt }
    }

    async fn run_wave(&mut self, wave_no: usize, wave: Vec<CandidateTest>) -> Vec<ExecutionOutcome> {
        let files: Vec<_> = wave.iter().map(|c| c.file_path.as_str()).collect();
        debug!(wave = wave_no, ?files, "starting wave");

        let mut set = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(wave.len());

        for candidate in wave {
            let started = Utc::now();
            let fut = self
                .executor
                .execute(candidate.clone(), self.timeout, self.cancel.clone());
            let handle = set.spawn(fut);
            in_flight.insert(handle.id(), (candidate, started));
        }

        let mut recorded = Vec::with_capacity(in_flight.len());
        while let Some(joined) = set.join_next_with_id().await {
            let outcome = match joined {
                Ok((id, Some(outcome))) => {
                    in_flight.remove(&id);
                    outcome
                }
                Ok((id, None)) => {
                    if let Some((candidate, _)) = in_flight.remove(&id) {
                        debug!(test = %candidate.file_path, "stopped before start; not recorded");
                    }
                    continue;
                }
                Err(err) => {
                    let Some((candidate, started)) = in_flight.remove(&err.id()) else {
                        warn!(error = %err, "executor task failed for an unknown candidate");
                        continue;
                    };
                    warn!(test = %candidate.file_path, error = %err, "executor task failed; recording as errored");
                    ExecutionOutcome::errored(&candidate, started, format!("executor task failed: {err}"))
                }
            };

            let outcome = parse_outcome(outcome);
            debug!(
                test = %outcome.test_file,
                status = %outcome.status,
                duration_ms = outcome.duration_ms,
                "outcome recorded"
            );
            for observer in &mut self.observers {
                observer.on_outcome(&outcome);
            }
            recorded.push(outcome);
        }

        recorded
    }
}
