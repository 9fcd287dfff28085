// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// Report artifact formats that can be enabled in `[report].formats`.
///
/// - `Json`: the full aggregated report.
/// - `Csv`: one row per outcome.
/// - `Html`: a self-contained, human-browsable page.
/// - `Snapshot`: the compact live snapshot polled by external dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
    Html,
    Snapshot,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 4] = [
        ReportFormat::Json,
        ReportFormat::Csv,
        ReportFormat::Html,
        ReportFormat::Snapshot,
    ];
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            "snapshot" => Ok(ReportFormat::Snapshot),
            other => Err(format!(
                "invalid report format: {other} (expected \"json\", \"csv\", \"html\" or \"snapshot\")"
            )),
        }
    }
}

/// How the scheduler walks the candidate list.
///
/// - `Sequential`: one candidate at a time, in discovery order.
/// - `Parallel`: consecutive waves of up to `max_concurrency` candidates;
///   the next wave starts only when the whole current wave has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    Sequential,
    Parallel { max_concurrency: usize },
}

impl Default for ScheduleMode {
    fn default() -> Self {
        ScheduleMode::Sequential
    }
}

impl ScheduleMode {
    /// Number of candidates started together.
    pub fn wave_size(self) -> usize {
        match self {
            ScheduleMode::Sequential => 1,
            ScheduleMode::Parallel { max_concurrency } => max_concurrency.max(1),
        }
    }
}
