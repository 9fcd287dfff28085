// src/parse/stats.rs

//! Statistics extraction from free-form test output.
//!
//! Two layers, each producing a [`PartialStats`]:
//!
//! 1. combined count patterns (first pattern in table order that matches
//!    wins; within a pattern the *last* occurrence wins, since final summaries
//!    are printed last);
//! 2. an independent success-rate pattern.
//!
//! The layers are merged with [`PartialStats::merge`], so an explicitly
//! printed rate always beats one derived from counts.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::model::PartialStats;

#[derive(Debug, Clone, Copy)]
enum StatField {
    Total,
    Passed,
    Failed,
    Skipped,
}

/// A regex whose capture groups `1..=n` map to `fields[0..n]`.
struct StatsPattern {
    regex: Regex,
    fields: &'static [StatField],
}

const COUNT_FIRST: &str = r"(?i)(\d+)\s*(?:tests?|测试|个测试|用例)\D{0,24}?(\d+)\s*(?:passed|pass|通过)\D{0,24}?(\d+)\s*(?:failed|failures?|fail|失败)(?:\D{0,24}?(\d+)\s*(?:skipped|skip|跳过))?";

const LABEL_FIRST: &str = r"(?i)(?:total(?:\s+tests)?|tests\s+run|总测试数?|测试总数|总数)\s*[:：=]\s*(\d+)\D{0,40}?(?:passed|通过)\s*[:：=]\s*(\d+)\D{0,40}?(?:failed|失败)\s*[:：=]\s*(\d+)(?:\D{0,40}?(?:skipped|跳过)\s*[:：=]\s*(\d+))?";

const JEST_STYLE: &str = r"(?i)tests:\s*(?:(\d+)\s+failed,\s*)?(?:(\d+)\s+skipped,\s*)?(?:(\d+)\s+passed,\s*)?(\d+)\s+total";

const SUCCESS_RATE: &str = r"(?i)(?:success\s*rate|pass\s*rate|成功率|通过率)\s*[:：=]?\s*(\d{1,3}(?:\.\d+)?)\s*%";

const STANDARD_FIELDS: &[StatField] = &[
    StatField::Total,
    StatField::Passed,
    StatField::Failed,
    StatField::Skipped,
];

const JEST_FIELDS: &[StatField] = &[
    StatField::Failed,
    StatField::Skipped,
    StatField::Passed,
    StatField::Total,
];

static COUNT_PATTERNS: LazyLock<Vec<StatsPattern>> = LazyLock::new(|| {
    [
        (COUNT_FIRST, STANDARD_FIELDS),
        (LABEL_FIRST, STANDARD_FIELDS),
        (JEST_STYLE, JEST_FIELDS),
    ]
    .into_iter()
    .filter_map(|(src, fields)| compile(src).map(|regex| StatsPattern { regex, fields }))
    .collect()
});

static RATE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| compile(SUCCESS_RATE));

/// A pattern that fails to compile is dropped: extraction degrades, it never
/// fails.
fn compile(src: &str) -> Option<Regex> {
    match Regex::new(src) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(error = %err, "output parser pattern failed to compile; skipping it");
            None
        }
    }
}

/// Layer 1: counts from the first matching combined pattern.
pub fn extract_counts(text: &str) -> PartialStats {
    for pattern in COUNT_PATTERNS.iter() {
        if let Some(caps) = pattern.regex.captures_iter(text).last() {
            return counts_from(&caps, pattern.fields);
        }
    }
    PartialStats::default()
}

fn counts_from(caps: &Captures<'_>, fields: &[StatField]) -> PartialStats {
    let mut stats = PartialStats::default();
    for (idx, field) in fields.iter().enumerate() {
        let value = caps
            .get(idx + 1)
            .and_then(|m| m.as_str().parse::<u32>().ok());
        let slot = match field {
            StatField::Total => &mut stats.total,
            StatField::Passed => &mut stats.passed,
            StatField::Failed => &mut stats.failed,
            StatField::Skipped => &mut stats.skipped,
        };
        *slot = value;
    }
    stats
}

/// Layer 2: an explicitly printed success rate, rounded and clamped to 100.
pub fn extract_success_rate(text: &str) -> Option<u32> {
    let re = RATE_PATTERN.as_ref()?;
    let caps = re.captures_iter(text).last()?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(value.round().clamp(0.0, 100.0) as u32)
}

/// Both layers merged; fields neither layer recovered stay `None`.
pub fn extract_stats(text: &str) -> PartialStats {
    let counts = extract_counts(text);
    let rate = PartialStats {
        success_rate_percent: extract_success_rate(text),
        ..PartialStats::default()
    };
    counts.merge(rate)
}
