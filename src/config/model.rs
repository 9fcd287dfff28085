// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::ReportFormat;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [run]
/// parallel = true
/// max_concurrency = 3
/// timeout_ms = 120000
/// continue_on_failure = true
/// acceptance_threshold = 90
///
/// [discovery]
/// root = "."
/// patterns = ["tests/**/*.js"]
/// exclude = ["tests/fixtures/**"]
///
/// [runner.env]
/// NODE_ENV = "test"
///
/// [report]
/// results_dir = "test-results"
///
/// [[category]]
/// keyword = "api"
/// name = "API"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the raw,
/// unvalidated form; see [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub report: ReportSection,

    /// Ordered keyword -> category rules from `[[category]]`. When empty the
    /// built-in rule table is used.
    #[serde(default)]
    pub category: Vec<CategoryRuleConfig>,
}

/// Validated configuration.
///
/// Built through `ConfigFile::try_from(RawConfigFile)` (or the loader). Code
/// that edits fields afterwards (CLI overrides) must re-run the run-limit
/// checks, see [`crate::engine::RunOptions::validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub run: RunSection,
    pub discovery: DiscoverySection,
    pub runner: RunnerSection,
    pub report: ReportSection,
    pub category: Vec<CategoryRuleConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            run: raw.run,
            discovery: raw.discovery,
            runner: raw.runner,
            report: raw.report,
            category: raw.category,
        }
    }

    /// Built-in defaults; always valid.
    pub fn defaults() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[run]` section: the invocation surface of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Run in bounded-parallel waves instead of sequentially.
    #[serde(default)]
    pub parallel: bool,

    /// Wave size in parallel mode. Must be >= 1.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-test wall-clock timeout. Must be > 0.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// If false, scheduling stops after the first wave containing a test
    /// that did not pass.
    #[serde(default = "default_true")]
    pub continue_on_failure: bool,

    /// Minimum overall success rate (0..=100) for the run to be accepted.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: u32,
}

fn default_max_concurrency() -> usize {
    3
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_true() -> bool {
    true
}

fn default_acceptance_threshold() -> u32 {
    90
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            parallel: false,
            max_concurrency: default_max_concurrency(),
            timeout_ms: default_timeout_ms(),
            continue_on_failure: true,
            acceptance_threshold: default_acceptance_threshold(),
        }
    }
}

/// `[discovery]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySection {
    /// Directory that patterns are relative to; also the working directory of
    /// every test process.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Include globs, matched against `/`-separated paths relative to `root`.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// Exclude globs, same form as `patterns`.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Case-insensitive file-name substrings that are never candidates
    /// (e.g. the scripts that drive the test run themselves).
    #[serde(default = "default_exclude_names")]
    pub exclude_names: Vec<String>,

    /// Directory names that are never descended into.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Content markers showing a file runs on its own when invoked.
    #[serde(default = "default_entry_markers")]
    pub entry_markers: Vec<String>,

    /// Content markers showing a file mainly exports reusable code.
    #[serde(default = "default_utility_markers")]
    pub utility_markers: Vec<String>,

    /// Names of shared helper/config modules, matched against the file stem
    /// or its last `-`/`_`/`.`-separated part (`test-utils` matches `utils`).
    #[serde(default = "default_helper_names")]
    pub helper_names: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_patterns() -> Vec<String> {
    strings(&["tests/**/*.js", "tests/**/*.mjs", "tests/**/*.py", "tests/**/*.sh"])
}

fn default_exclude_names() -> Vec<String> {
    strings(&["run-all", "test-runner", "report-generator"])
}

fn default_skip_dirs() -> Vec<String> {
    strings(&["node_modules", ".git", "target", "test-results"])
}

fn default_entry_markers() -> Vec<String> {
    strings(&[
        "require.main === module",
        "import.meta.main",
        "if __name__ == \"__main__\"",
        "if __name__ == '__main__'",
        "puppeteer.launch(",
        "chromium.launch(",
        "firefox.launch(",
        "webkit.launch(",
        "#!/",
    ])
}

fn default_utility_markers() -> Vec<String> {
    strings(&[
        "module.exports = class",
        "module.exports = {",
        "export default class",
    ])
}

fn default_helper_names() -> Vec<String> {
    strings(&["utils", "util", "helpers", "helper", "config", "constants", "base-test", "setup"])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            root: default_root(),
            patterns: default_patterns(),
            exclude: Vec::new(),
            exclude_names: default_exclude_names(),
            skip_dirs: default_skip_dirs(),
            entry_markers: default_entry_markers(),
            utility_markers: default_utility_markers(),
            helper_names: default_helper_names(),
        }
    }
}

/// `[runner]` section: how a candidate becomes a process.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Extra environment for every test process, on top of the inherited one.
    #[serde(default = "default_env")]
    pub env: BTreeMap<String, String>,

    /// File extension -> launcher command (split on whitespace, the candidate
    /// path is appended). Files with no entry are executed directly.
    #[serde(default = "default_interpreters")]
    pub interpreters: BTreeMap<String, String>,

    /// Cap per captured stream; the tail is kept when exceeded.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_env() -> BTreeMap<String, String> {
    BTreeMap::from([("NODE_ENV".to_string(), "test".to_string())])
}

fn default_interpreters() -> BTreeMap<String, String> {
    [
        ("js", "node"),
        ("mjs", "node"),
        ("cjs", "node"),
        ("py", "python3"),
        ("sh", "sh"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_max_output_bytes() -> usize {
    1024 * 1024
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            env: default_env(),
            interpreters: default_interpreters(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    /// Where artifacts are written; previous files of the same name are
    /// overwritten.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_formats")]
    pub formats: Vec<ReportFormat>,

    /// Rewrite the live snapshot after every finished wave, not only at the end.
    #[serde(default = "default_true")]
    pub live_updates: bool,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("test-results")
}

fn default_formats() -> Vec<ReportFormat> {
    ReportFormat::ALL.to_vec()
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            formats: default_formats(),
            live_updates: true,
        }
    }
}

/// One `[[category]]` rule: files whose name contains `keyword`
/// (case-insensitive) belong to category `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRuleConfig {
    pub keyword: String,
    pub name: String,
}
