// src/engine/scheduler.rs

//! Pure wave scheduler.
//!
//! [`WaveScheduler`] decides *what* runs next; it never touches Tokio,
//! processes or the filesystem, so every scheduling rule is unit-testable
//! with plain outcome values. The async shell in [`super::runtime`] feeds it
//! the outcomes of each wave.

use std::collections::VecDeque;

use tracing::debug;

use crate::model::{CandidateTest, ExecutionOutcome, HaltReason};
use crate::types::ScheduleMode;

#[derive(Debug, Clone)]
pub struct WaveScheduler {
    pending: VecDeque<CandidateTest>,
    mode: ScheduleMode,
    continue_on_failure: bool,
    halt: Option<HaltReason>,
    waves_started: usize,
}

impl WaveScheduler {
    pub fn new(candidates: Vec<CandidateTest>, mode: ScheduleMode, continue_on_failure: bool) -> Self {
        Self {
            pending: candidates.into(),
            mode,
            continue_on_failure,
            halt: None,
            waves_started: 0,
        }
    }

    /// Next chunk of candidates to start together, or `None` once the list
    /// is exhausted or the run has been halted.
    pub fn next_wave(&mut self) -> Option<Vec<CandidateTest>> {
        if self.halt.is_some() || self.pending.is_empty() {
            return None;
        }
        let size = self.mode.wave_size().min(self.pending.len());
        let wave: Vec<_> = self.pending.drain(..size).collect();
        self.waves_started += 1;
        debug!(wave = self.waves_started, size = wave.len(), remaining = self.pending.len(), "next wave");
        Some(wave)
    }

    /// Feed back the outcomes of the wave that just finished.
    ///
    /// With `continue_on_failure == false` the first non-passing outcome (in
    /// recorded order) halts the run.
    pub fn record_wave(&mut self, outcomes: &[ExecutionOutcome]) {
        if self.continue_on_failure || self.halt.is_some() {
            return;
        }
        if let Some(first) = outcomes.iter().find(|o| !o.status.is_passed()) {
            debug!(test = %first.test_file, status = %first.status, "halting after failure");
            self.halt = Some(HaltReason::FirstFailure {
                test_file: first.test_file.clone(),
                status: first.status,
            });
        }
    }

    /// Halt immediately; pending candidates will never start.
    pub fn cancel(&mut self) {
        if self.halt.is_none() {
            self.halt = Some(HaltReason::Cancelled);
        }
    }

    pub fn halt_reason(&self) -> Option<&HaltReason> {
        self.halt.as_ref()
    }

    pub fn into_halt_reason(self) -> Option<HaltReason> {
        self.halt
    }

    /// Candidates not yet handed out.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn waves_started(&self) -> usize {
        self.waves_started
    }

    pub fn mode(&self) -> ScheduleMode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.halt.is_some() || self.pending.is_empty()
    }
}
