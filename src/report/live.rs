// src/report/live.rs

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::ReportEmitter;
use super::snapshot::SnapshotEmitter;
use crate::aggregate::{AggregateInput, CategoryRules, aggregate};
use crate::engine::RunObserver;
use crate::fs::FileSystem;
use crate::model::ExecutionOutcome;

/// Rewrites the live snapshot after every finished wave, so dashboards can
/// follow a run in progress.
#[derive(Debug)]
pub struct LiveSnapshotObserver {
    fs: Arc<dyn FileSystem>,
    results_dir: PathBuf,
    rules: CategoryRules,
    discovered_tests: usize,
    start_time: DateTime<Utc>,
}

impl LiveSnapshotObserver {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        results_dir: impl Into<PathBuf>,
        rules: CategoryRules,
        discovered_tests: usize,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            fs,
            results_dir: results_dir.into(),
            rules,
            discovered_tests,
            start_time,
        }
    }
}

impl RunObserver for LiveSnapshotObserver {
    fn on_wave_finished(&mut self, wave: usize, outcomes: &[ExecutionOutcome]) {
        let report = aggregate(AggregateInput {
            outcomes,
            discovered_tests: self.discovered_tests,
            start_time: self.start_time,
            end_time: Utc::now(),
            stopped_early: None,
            rules: &self.rules,
        });

        let emitter = SnapshotEmitter;
        let path = self.results_dir.join(emitter.file_name());
        match emitter.render(&report).and_then(|bytes| self.fs.write(&path, &bytes)) {
            Ok(()) => debug!(wave, recorded = outcomes.len(), path = %path.display(), "live snapshot updated"),
            Err(err) => warn!(wave, path = %path.display(), error = %format!("{err:#}"), "failed to update live snapshot"),
        }
    }
}
