// src/model/outcome.rs

//! Per-candidate execution outcome and the parsed statistics attached to it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::CandidateTest;

/// Final status of one attempted candidate. Exactly one per outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Passed,
    Failed,
    Errored,
    TimedOut,
}

impl ExecutionStatus {
    pub fn is_passed(self) -> bool {
        matches!(self, ExecutionStatus::Passed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Passed => "passed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Errored => "errored",
            ExecutionStatus::TimedOut => "timedout",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a child process ended, as observed by the process runner.
///
/// This is the raw input to status classification; it is kept separate from
/// [`ExecutionStatus`] so the precedence rules live in one place
/// ([`ProcessEnd::status`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEnd {
    /// The process exited on its own. `None` when it was killed by a signal
    /// that we did not send.
    Exited(Option<i32>),
    /// The timeout fired and the process was terminated.
    TimedOut,
    /// A stop request terminated the process.
    Cancelled,
    /// The process could not be started, or waiting on it failed.
    SpawnFailed(String),
}

impl ProcessEnd {
    /// Classify the end state. A timeout wins over any exit code observed
    /// after termination.
    pub fn status(&self) -> ExecutionStatus {
        match self {
            ProcessEnd::Exited(Some(0)) => ExecutionStatus::Passed,
            ProcessEnd::Exited(_) => ExecutionStatus::Failed,
            ProcessEnd::TimedOut => ExecutionStatus::TimedOut,
            ProcessEnd::Cancelled | ProcessEnd::SpawnFailed(_) => ExecutionStatus::Errored,
        }
    }

    /// Exit code to record; only a normal exit carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessEnd::Exited(code) => *code,
            _ => None,
        }
    }
}

/// Concrete statistics recovered from a test program's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStats {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub success_rate_percent: Option<u32>,
}

/// Partially recovered statistics: every field is optional because each
/// parsing heuristic only recovers some of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialStats {
    pub total: Option<u32>,
    pub passed: Option<u32>,
    pub failed: Option<u32>,
    pub skipped: Option<u32>,
    pub success_rate_percent: Option<u32>,
}

impl PartialStats {
    pub fn is_empty(&self) -> bool {
        self.total.is_none()
            && self.passed.is_none()
            && self.failed.is_none()
            && self.skipped.is_none()
            && self.success_rate_percent.is_none()
    }

    fn has_counts(&self) -> bool {
        self.total.is_some() || self.passed.is_some() || self.failed.is_some()
    }

    /// Field-wise merge where every field present in `fresher` wins over the
    /// value in `self`. Fields absent from `fresher` keep their old value.
    pub fn merge(self, fresher: PartialStats) -> PartialStats {
        PartialStats {
            total: fresher.total.or(self.total),
            passed: fresher.passed.or(self.passed),
            failed: fresher.failed.or(self.failed),
            skipped: fresher.skipped.or(self.skipped),
            success_rate_percent: fresher.success_rate_percent.or(self.success_rate_percent),
        }
    }

    /// Values implied by the fields that are present (e.g. a missing total is
    /// the sum of the known counts). Used as the base layer of [`Self::resolve`].
    fn inferred_defaults(&self) -> PartialStats {
        let passed = self.passed.unwrap_or(0);
        let failed = self.failed.unwrap_or(0);
        let skipped = self.skipped.unwrap_or(0);
        // Counts come from untrusted output; never overflow on absurd values.
        let total = self
            .total
            .unwrap_or_else(|| passed.saturating_add(failed).saturating_add(skipped));

        let inferred_failed = self
            .passed
            .map(|p| total.saturating_sub(p).saturating_sub(skipped));
        let inferred_passed = self
            .failed
            .map(|f| total.saturating_sub(f).saturating_sub(skipped));

        PartialStats {
            total: Some(total),
            passed: Some(inferred_passed.unwrap_or(passed)),
            failed: Some(inferred_failed.unwrap_or(failed)),
            skipped: Some(skipped),
            success_rate_percent: None,
        }
    }

    /// Turn the partial result into concrete stats.
    ///
    /// Returns `None` when nothing at all was recovered. Parsed fields always
    /// take precedence over inferred ones; the success rate is derived from
    /// the counts only when no explicit rate was parsed.
    pub fn resolve(self) -> Option<ParsedStats> {
        if self.is_empty() {
            return None;
        }
        if !self.has_counts() {
            return Some(ParsedStats {
                success_rate_percent: self.success_rate_percent,
                ..ParsedStats::default()
            });
        }

        let merged = self.inferred_defaults().merge(self);
        let total = merged.total.unwrap_or(0);
        let passed = merged.passed.unwrap_or(0);
        let derived_rate =
            (total > 0).then(|| percent(passed.min(total) as usize, total as usize));

        Some(ParsedStats {
            total,
            passed,
            failed: merged.failed.unwrap_or(0),
            skipped: merged.skipped.unwrap_or(0),
            success_rate_percent: merged.success_rate_percent.or(derived_rate),
        })
    }
}

/// `round(part / whole * 100)`, defined as 0 when `whole == 0`.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Recorded result of attempting to run one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub test_file: String,
    pub test_name: String,
    pub status: ExecutionStatus,
    pub exit_code: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub stdout: String,
    pub stderr: String,
    #[serde(default)]
    pub stdout_truncated: bool,
    #[serde(default)]
    pub stderr_truncated: bool,
    pub parsed_stats: Option<ParsedStats>,
    #[serde(default)]
    pub error_lines: Vec<String>,
    #[serde(default)]
    pub has_screenshots: bool,
    #[serde(default)]
    pub cancelled: bool,
}

impl ExecutionOutcome {
    /// Build an outcome from how the process ended. Output fields start empty
    /// and are filled by the runner.
    pub fn from_end(
        candidate: &CandidateTest,
        end: &ProcessEnd,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let mut stderr = String::new();
        if let ProcessEnd::SpawnFailed(msg) = end {
            stderr.push_str(msg);
        }
        Self {
            test_file: candidate.file_path.clone(),
            test_name: candidate.file_name.clone(),
            status: end.status(),
            exit_code: end.exit_code(),
            start_time,
            end_time,
            duration_ms,
            stdout: String::new(),
            stderr,
            stdout_truncated: false,
            stderr_truncated: false,
            parsed_stats: None,
            error_lines: Vec::new(),
            has_screenshots: false,
            cancelled: matches!(end, ProcessEnd::Cancelled),
        }
    }

    /// Outcome for a run that never produced a process (spawn failure,
    /// executor panic, ...).
    pub fn errored(candidate: &CandidateTest, start_time: DateTime<Utc>, message: impl Into<String>) -> Self {
        let end_time = Utc::now();
        let duration_ms = (end_time - start_time).num_milliseconds().max(0) as u64;
        Self::from_end(
            candidate,
            &ProcessEnd::SpawnFailed(message.into()),
            start_time,
            end_time,
            duration_ms,
        )
    }

    /// stdout followed by stderr, the text the output parser works on.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        if self.stdout.is_empty() {
            return self.stderr.clone();
        }
        format!("{}\n{}", self.stdout, self.stderr)
    }

    pub fn success_rate_percent(&self) -> Option<u32> {
        self.parsed_stats.and_then(|s| s.success_rate_percent)
    }
}
