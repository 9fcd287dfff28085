// src/report/csv.rs

use std::borrow::Cow;

use anyhow::Result;

use super::ReportEmitter;
use crate::model::AggregatedReport;

pub const CSV_REPORT_FILE: &str = "test-results.csv";

pub const CSV_HEADER: &str = "testFile,status,durationMillis,successRatePercent,errorLines";

/// Separator between error lines inside the single `errorLines` cell.
pub const ERROR_LINE_SEPARATOR: &str = " | ";

/// One row per outcome, in execution order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEmitter;

impl ReportEmitter for CsvEmitter {
    fn name(&self) -> &str {
        "csv"
    }

    fn file_name(&self) -> &str {
        CSV_REPORT_FILE
    }

    fn render(&self, report: &AggregatedReport) -> Result<Vec<u8>> {
        let mut out = String::with_capacity(64 * (report.outcomes.len() + 1));
        out.push_str(CSV_HEADER);
        out.push_str("\r\n");

        for o in &report.outcomes {
            let rate = o
                .success_rate_percent()
                .map(|r| r.to_string())
                .unwrap_or_default();
            let errors = o.error_lines.join(ERROR_LINE_SEPARATOR);
            let fields = [
                escape_field(&o.test_file),
                Cow::Borrowed(o.status.as_str()),
                Cow::Owned(o.duration_ms.to_string()),
                Cow::Owned(rate),
                escape_field(&errors),
            ];
            out.push_str(&fields.join(","));
            out.push_str("\r\n");
        }

        Ok(out.into_bytes())
    }
}

/// Quote a field per RFC 4180 when it contains a comma, quote or line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
