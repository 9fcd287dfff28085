// src/parse/mod.rs

//! Best-effort parsing of test program output.
//!
//! Test programs print whatever they like. Everything here is a heuristic
//! over untrusted text, and nothing in this module can fail: an unrecognised
//! output simply leaves the corresponding fields absent.
//!
//! - [`stats`]: pass/fail/skip counts and success rate.
//! - [`failures`]: diagnostic lines and the screenshot hint.

pub mod failures;
pub mod stats;

use crate::model::{ExecutionOutcome, ExecutionStatus, PartialStats};

pub use failures::{MAX_ERROR_LINES, extract_error_lines, mentions_screenshots};
pub use stats::{extract_counts, extract_stats, extract_success_rate};

/// Everything the parser recovers from one block of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub stats: PartialStats,
    pub error_lines: Vec<String>,
    pub has_screenshots: bool,
}

/// Parse combined output text. `failed` controls whether diagnostic lines
/// are collected.
pub fn parse_text(text: &str, failed: bool) -> ParsedOutput {
    ParsedOutput {
        stats: extract_stats(text),
        error_lines: if failed {
            extract_error_lines(text)
        } else {
            Vec::new()
        },
        has_screenshots: mentions_screenshots(text),
    }
}

/// Return `outcome` enriched with parsed stats, error lines and the
/// screenshot hint. Status, exit code and timings are never touched.
pub fn parse_outcome(mut outcome: ExecutionOutcome) -> ExecutionOutcome {
    let text = outcome.combined_output();
    let parsed = parse_text(&text, outcome.status == ExecutionStatus::Failed);

    outcome.parsed_stats = parsed.stats.resolve();
    outcome.error_lines = parsed.error_lines;
    outcome.has_screenshots = parsed.has_screenshots;
    outcome
}
