// src/aggregate/recommend.rs

//! Rule-based recommendations derived from a finished run.

use crate::model::{
    ExecutionOutcome, ExecutionStatus, ExecutionSummary, PerformanceStats, Recommendation,
    Severity,
};

/// Below this overall success rate the run gets a stabilisation warning.
pub const LOW_SUCCESS_RATE: u32 = 80;

/// Evaluate every rule independently; the result is sorted by severity
/// (errors first), ties keeping rule order.
pub fn recommend(
    summary: &ExecutionSummary,
    outcomes: &[ExecutionOutcome],
    performance: &PerformanceStats,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let failed = files_with(outcomes, ExecutionStatus::Failed);
    if !failed.is_empty() {
        recs.push(Recommendation {
            severity: Severity::Error,
            title: "Fix failing tests".to_string(),
            description: format!(
                "{} test(s) exited with a non-zero code. Inspect their error lines and fix the underlying defects.",
                failed.len()
            ),
            affected_tests: failed,
        });
    }

    // A stop request is not an environment problem; those get their own note.
    let (cancelled, errored): (Vec<_>, Vec<_>) = outcomes
        .iter()
        .filter(|o| o.status == ExecutionStatus::Errored)
        .partition(|o| o.cancelled);
    let errored: Vec<String> = errored.into_iter().map(|o| o.test_file.clone()).collect();
    let cancelled: Vec<String> = cancelled.into_iter().map(|o| o.test_file.clone()).collect();
    if !errored.is_empty() {
        recs.push(Recommendation {
            severity: Severity::Error,
            title: "Check the test environment".to_string(),
            description: format!(
                "{} test(s) could not be run to completion. Verify interpreters, dependencies and file permissions.",
                errored.len()
            ),
            affected_tests: errored,
        });
    }

    let timed_out = files_with(outcomes, ExecutionStatus::TimedOut);
    if !timed_out.is_empty() {
        recs.push(Recommendation {
            severity: Severity::Warning,
            title: "Review timeouts".to_string(),
            description: format!(
                "{} test(s) exceeded the timeout. Look for hangs or raise the timeout for slow suites.",
                timed_out.len()
            ),
            affected_tests: timed_out,
        });
    }

    if summary.total_tests > 0 && summary.success_rate_percent < LOW_SUCCESS_RATE {
        recs.push(Recommendation {
            severity: Severity::Warning,
            title: "Stabilise the test suite".to_string(),
            description: format!(
                "Overall success rate is {}%, below {}%. Prioritise broad stabilisation before adding tests.",
                summary.success_rate_percent, LOW_SUCCESS_RATE
            ),
            affected_tests: Vec::new(),
        });
    }

    if !performance.slow_outcomes.is_empty() {
        recs.push(Recommendation {
            severity: Severity::Info,
            title: "Investigate slow tests".to_string(),
            description: format!(
                "{} test(s) took more than twice the mean duration of {:.0} ms.",
                performance.slow_outcomes.len(),
                performance.mean_duration_ms
            ),
            affected_tests: performance
                .slow_outcomes
                .iter()
                .map(|s| s.test_file.clone())
                .collect(),
        });
    }

    if !cancelled.is_empty() {
        recs.push(Recommendation {
            severity: Severity::Info,
            title: "Re-run interrupted tests".to_string(),
            description: format!(
                "{} test(s) were terminated by a stop request before finishing; their results are incomplete.",
                cancelled.len()
            ),
            affected_tests: cancelled,
        });
    }

    // `sort_by_key` is stable, so rule order survives within a severity.
    recs.sort_by_key(|r| r.severity);
    recs
}

fn files_with(outcomes: &[ExecutionOutcome], status: ExecutionStatus) -> Vec<String> {
    outcomes
        .iter()
        .filter(|o| o.status == status)
        .map(|o| o.test_file.clone())
        .collect()
}
