// src/report/json.rs

use anyhow::{Context, Result};

use super::ReportEmitter;
use crate::model::AggregatedReport;

pub const JSON_REPORT_FILE: &str = "test-report.json";

/// The full aggregated report, pretty-printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportEmitter;

impl ReportEmitter for JsonReportEmitter {
    fn name(&self) -> &str {
        "json"
    }

    fn file_name(&self) -> &str {
        JSON_REPORT_FILE
    }

    fn render(&self, report: &AggregatedReport) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(report).context("serialising aggregated report")
    }
}
