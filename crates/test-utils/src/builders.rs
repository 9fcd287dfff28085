#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use testherd::config::{CategoryRuleConfig, ConfigFile, RawConfigFile};
use testherd::model::{CandidateTest, ExecutionOutcome, ExecutionStatus, ProcessEnd};
use testherd::types::ReportFormat;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.discovery.root = root.into();
        self
    }

    pub fn patterns(mut self, patterns: &[&str]) -> Self {
        self.config.discovery.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.discovery.exclude.push(pattern.to_string());
        self
    }

    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.report.results_dir = dir.into();
        self
    }

    pub fn formats(mut self, formats: &[ReportFormat]) -> Self {
        self.config.report.formats = formats.to_vec();
        self
    }

    pub fn live_updates(mut self, enabled: bool) -> Self {
        self.config.report.live_updates = enabled;
        self
    }

    pub fn interpreter(mut self, ext: &str, program: &str) -> Self {
        self.config
            .runner
            .interpreters
            .insert(ext.to_string(), program.to_string());
        self
    }

    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.config.runner.max_output_bytes = bytes;
        self
    }

    pub fn category(mut self, keyword: &str, name: &str) -> Self {
        self.config.category.push(CategoryRuleConfig {
            keyword: keyword.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed reference time so aggregated timestamps are deterministic.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Builder for recorded outcomes, for aggregator and emitter tests.
pub struct OutcomeBuilder {
    outcome: ExecutionOutcome,
}

impl OutcomeBuilder {
    pub fn new(file_path: &str, status: ExecutionStatus) -> Self {
        let end = match status {
            ExecutionStatus::Passed => ProcessEnd::Exited(Some(0)),
            ExecutionStatus::Failed => ProcessEnd::Exited(Some(1)),
            ExecutionStatus::TimedOut => ProcessEnd::TimedOut,
            ExecutionStatus::Errored => ProcessEnd::SpawnFailed("scripted spawn failure".into()),
        };
        let candidate = CandidateTest::new(file_path, true);
        Self {
            outcome: ExecutionOutcome::from_end(&candidate, &end, t0(), t0(), 0),
        }
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.outcome.duration_ms = ms;
        self.outcome.end_time = self.outcome.start_time + Duration::milliseconds(ms as i64);
        self
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.outcome.stdout = text.to_string();
        self
    }

    pub fn error_lines(mut self, lines: &[&str]) -> Self {
        self.outcome.error_lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn build(self) -> ExecutionOutcome {
        self.outcome
    }
}

/// Outcome of a test terminated by a stop request.
pub fn cancelled(file_path: &str) -> ExecutionOutcome {
    let candidate = CandidateTest::new(file_path, true);
    ExecutionOutcome::from_end(&candidate, &ProcessEnd::Cancelled, t0(), t0(), 0)
}

pub fn passed(file_path: &str) -> ExecutionOutcome {
    OutcomeBuilder::new(file_path, ExecutionStatus::Passed).build()
}

pub fn failed(file_path: &str) -> ExecutionOutcome {
    OutcomeBuilder::new(file_path, ExecutionStatus::Failed).build()
}

pub fn candidates(paths: &[&str]) -> Vec<CandidateTest> {
    paths.iter().map(|p| CandidateTest::new(*p, true)).collect()
}
