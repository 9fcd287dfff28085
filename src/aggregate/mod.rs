// src/aggregate/mod.rs

//! Turning recorded outcomes into an [`AggregatedReport`].
//!
//! Everything here is pure: no clock reads, no IO. Timestamps and the
//! discovered count are passed in by the caller.
//!
//! - [`categories`]: keyword rule table mapping files to categories.
//! - [`stats`]: duration statistics and slow-test detection.
//! - [`recommend`]: rule-based recommendations.

pub mod categories;
pub mod recommend;
pub mod stats;

use chrono::{DateTime, Utc};

use crate::model::{
    AggregatedReport, CategoryBucket, ExecutionOutcome, ExecutionStatus, ExecutionSummary,
    HaltReason, percent,
};

pub use categories::{CategoryRules, FALLBACK_CATEGORY};
pub use recommend::{LOW_SUCCESS_RATE, recommend};
pub use stats::{SLOW_FACTOR, performance_stats};

/// Everything the aggregator needs about one run.
#[derive(Debug, Clone, Copy)]
pub struct AggregateInput<'a> {
    pub outcomes: &'a [ExecutionOutcome],
    pub discovered_tests: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub stopped_early: Option<&'a HaltReason>,
    pub rules: &'a CategoryRules,
}

pub fn aggregate(input: AggregateInput<'_>) -> AggregatedReport {
    let execution_summary = summarize(&input);
    let categories = categorize(input.outcomes, input.rules);
    let performance = performance_stats(input.outcomes);
    let recommendations = recommend(&execution_summary, input.outcomes, &performance);

    AggregatedReport {
        execution_summary,
        outcomes: input.outcomes.to_vec(),
        categories,
        performance,
        recommendations,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StatusCounts {
    total: usize,
    passed: usize,
    failed: usize,
    errored: usize,
    timed_out: usize,
}

impl StatusCounts {
    fn add(&mut self, status: ExecutionStatus) {
        self.total += 1;
        match status {
            ExecutionStatus::Passed => self.passed += 1,
            ExecutionStatus::Failed => self.failed += 1,
            ExecutionStatus::Errored => self.errored += 1,
            ExecutionStatus::TimedOut => self.timed_out += 1,
        }
    }

    fn success_rate(&self) -> u32 {
        percent(self.passed, self.total)
    }
}

fn summarize(input: &AggregateInput<'_>) -> ExecutionSummary {
    let mut counts = StatusCounts::default();
    for outcome in input.outcomes {
        counts.add(outcome.status);
    }

    ExecutionSummary {
        discovered_tests: input.discovered_tests,
        total_tests: counts.total,
        passed: counts.passed,
        failed: counts.failed,
        errored: counts.errored,
        timed_out: counts.timed_out,
        success_rate_percent: counts.success_rate(),
        start_time: input.start_time,
        end_time: input.end_time,
        total_duration_ms: (input.end_time - input.start_time).num_milliseconds().max(0) as u64,
        stopped_early: input.stopped_early.cloned(),
    }
}

/// Non-empty buckets in rule order, fallback last.
fn categorize(outcomes: &[ExecutionOutcome], rules: &CategoryRules) -> Vec<CategoryBucket> {
    let names = rules.category_names();
    let mut counts = vec![StatusCounts::default(); names.len()];

    for outcome in outcomes {
        let category = rules.categorize(&outcome.test_name);
        if let Some(idx) = names.iter().position(|n| *n == category) {
            counts[idx].add(outcome.status);
        }
    }

    names
        .into_iter()
        .zip(counts)
        .filter(|(_, c)| c.total > 0)
        .map(|(name, c)| CategoryBucket {
            name: name.to_string(),
            total: c.total,
            passed: c.passed,
            failed: c.failed,
            errored: c.errored,
            timed_out: c.timed_out,
            success_rate_percent: c.success_rate(),
        })
        .collect()
}
