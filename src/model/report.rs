// src/model/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::{ExecutionOutcome, ExecutionStatus};

/// Why the scheduler stopped before running every candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum HaltReason {
    /// `continue_on_failure = false` and this test did not pass.
    #[serde(rename_all = "camelCase")]
    FirstFailure {
        test_file: String,
        status: ExecutionStatus,
    },
    /// An external stop request arrived.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub discovered_tests: usize,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub timed_out: usize,
    pub success_rate_percent: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration_ms: u64,
    pub stopped_early: Option<HaltReason>,
}

/// Aggregated counters for one inferred category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub timed_out: usize,
    pub success_rate_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlowOutcome {
    pub test_file: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub mean_duration_ms: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub slow_outcomes: Vec<SlowOutcome>,
}

/// Ordered from most to least severe; the derived `Ord` drives
/// recommendation sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub affected_tests: Vec<String>,
}

/// Everything one run produced, built once by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    pub execution_summary: ExecutionSummary,
    pub outcomes: Vec<ExecutionOutcome>,
    pub categories: Vec<CategoryBucket>,
    pub performance: PerformanceStats,
    pub recommendations: Vec<Recommendation>,
}
