// src/report/mod.rs

//! Report artifacts.
//!
//! Each artifact is produced by a [`ReportEmitter`] that only renders bytes;
//! [`emit_all`] owns the writing, so one broken emitter (or one unwritable
//! file) never prevents the others from being written.

pub mod csv;
pub mod html;
pub mod json;
pub mod live;
pub mod snapshot;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::fs::FileSystem;
use crate::model::AggregatedReport;
use crate::types::ReportFormat;

pub use self::csv::CsvEmitter;
pub use self::html::HtmlReportEmitter;
pub use self::json::JsonReportEmitter;
pub use self::live::LiveSnapshotObserver;
pub use self::snapshot::{LiveSnapshot, SnapshotEmitter, SnapshotTest};

/// Renders one report artifact.
pub trait ReportEmitter: Send + Sync {
    /// Short name used in logs and failure records.
    fn name(&self) -> &str;

    /// File name inside the results directory.
    fn file_name(&self) -> &str;

    fn render(&self, report: &AggregatedReport) -> Result<Vec<u8>>;
}

/// One emitter that could not produce its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitFailure {
    pub emitter: String,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<EmitFailure>,
}

impl EmitSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Emitters for the enabled formats, in the order given.
pub fn emitters_for(formats: &[ReportFormat]) -> Vec<Box<dyn ReportEmitter>> {
    formats
        .iter()
        .map(|format| -> Box<dyn ReportEmitter> {
            match format {
                ReportFormat::Json => Box::new(JsonReportEmitter),
                ReportFormat::Csv => Box::new(CsvEmitter),
                ReportFormat::Html => Box::new(HtmlReportEmitter),
                ReportFormat::Snapshot => Box::new(SnapshotEmitter),
            }
        })
        .collect()
}

/// Render and write every emitter's artifact into `results_dir`,
/// overwriting previous files. Failures are collected, not propagated.
pub fn emit_all(
    fs: &dyn FileSystem,
    results_dir: &Path,
    report: &AggregatedReport,
    emitters: &[Box<dyn ReportEmitter>],
) -> EmitSummary {
    let mut summary = EmitSummary::default();

    for emitter in emitters {
        let path = results_dir.join(emitter.file_name());
        let written = emitter
            .render(report)
            .and_then(|bytes| fs.write(&path, &bytes));

        match written {
            Ok(()) => {
                info!(emitter = emitter.name(), path = %path.display(), "report written");
                summary.written.push(path);
            }
            Err(err) => {
                warn!(emitter = emitter.name(), path = %path.display(), error = %format!("{err:#}"), "report emitter failed");
                summary.failures.push(EmitFailure {
                    emitter: emitter.name().to_string(),
                    path,
                    error: format!("{err:#}"),
                });
            }
        }
    }

    summary
}
