// src/aggregate/stats.rs

use crate::model::{ExecutionOutcome, PerformanceStats, SlowOutcome};

/// An outcome is slow when it took more than this many times the mean.
pub const SLOW_FACTOR: f64 = 2.0;

/// Duration statistics over every recorded outcome.
///
/// An empty run yields all-zero stats and no slow outcomes.
pub fn performance_stats(outcomes: &[ExecutionOutcome]) -> PerformanceStats {
    if outcomes.is_empty() {
        return PerformanceStats {
            mean_duration_ms: 0.0,
            min_duration_ms: 0,
            max_duration_ms: 0,
            slow_outcomes: Vec::new(),
        };
    }

    let total: u128 = outcomes.iter().map(|o| o.duration_ms as u128).sum();
    let mean = total as f64 / outcomes.len() as f64;
    let min = outcomes.iter().map(|o| o.duration_ms).min().unwrap_or(0);
    let max = outcomes.iter().map(|o| o.duration_ms).max().unwrap_or(0);

    let slow_outcomes = outcomes
        .iter()
        .filter(|o| o.duration_ms as f64 > SLOW_FACTOR * mean)
        .map(|o| SlowOutcome {
            test_file: o.test_file.clone(),
            duration_ms: o.duration_ms,
        })
        .collect();

    PerformanceStats {
        mean_duration_ms: mean,
        min_duration_ms: min,
        max_duration_ms: max,
        slow_outcomes,
    }
}
