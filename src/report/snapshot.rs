// src/report/snapshot.rs

//! Compact snapshot polled by external dashboards.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReportEmitter;
use crate::model::{AggregatedReport, CategoryBucket, ExecutionStatus, ExecutionSummary};

pub const SNAPSHOT_FILE: &str = "live-snapshot.json";

/// Keys are camelCase, like the full JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub generated_at: DateTime<Utc>,
    pub execution_summary: ExecutionSummary,
    pub categories: Vec<CategoryBucket>,
    pub tests: Vec<SnapshotTest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTest {
    pub name: String,
    pub file: String,
    pub status: ExecutionStatus,
    pub duration_ms: u64,
    pub success_rate_percent: Option<u32>,
    pub error_count: usize,
    pub has_screenshots: bool,
}

impl LiveSnapshot {
    pub fn from_report(report: &AggregatedReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            execution_summary: report.execution_summary.clone(),
            categories: report.categories.clone(),
            tests: report
                .outcomes
                .iter()
                .map(|o| SnapshotTest {
                    name: o.test_name.clone(),
                    file: o.test_file.clone(),
                    status: o.status,
                    duration_ms: o.duration_ms,
                    success_rate_percent: o.success_rate_percent(),
                    error_count: o.error_lines.len(),
                    has_screenshots: o.has_screenshots,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotEmitter;

impl ReportEmitter for SnapshotEmitter {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn file_name(&self) -> &str {
        SNAPSHOT_FILE
    }

    fn render(&self, report: &AggregatedReport) -> Result<Vec<u8>> {
        let snapshot = LiveSnapshot::from_report(report, report.execution_summary.end_time);
        serde_json::to_vec_pretty(&snapshot).context("serialising live snapshot")
    }
}
