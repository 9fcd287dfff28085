// src/discovery/mod.rs

//! Test discovery.
//!
//! Turns `[discovery]` patterns into a deduplicated, path-sorted list of
//! [`CandidateTest`]s:
//!
//! - [`patterns`] compiles include/exclude globs and walks the root.
//! - [`classify`] decides from file content whether a match is a standalone
//!   test program or a shared module.
//!
//! Nothing in here is fatal per file: unreadable files and directories are
//! logged and skipped.

pub mod classify;
pub mod patterns;

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::DiscoverySection;
use crate::fs::FileSystem;
use crate::model::CandidateTest;

pub use classify::{Classification, ClassifyRules};
pub use patterns::{DiscoveryPatterns, collect_matching_files, relative_path};

/// Discover every executable candidate under `section.root`.
///
/// Only returns candidates classified as executable. Running this twice on an
/// unchanged tree yields the same list.
pub fn discover(fs: &dyn FileSystem, section: &DiscoverySection) -> Result<Vec<CandidateTest>> {
    let all = scan(fs, section)?;
    let total = all.len();
    let candidates: Vec<CandidateTest> = all.into_iter().filter(|c| c.is_executable).collect();

    info!(
        root = %section.root.display(),
        matched = total,
        executable = candidates.len(),
        "discovery finished"
    );
    Ok(candidates)
}

/// Like [`discover`], but keeps non-executable matches (with
/// `is_executable = false`) so callers can show why a file was skipped.
pub fn scan(fs: &dyn FileSystem, section: &DiscoverySection) -> Result<Vec<CandidateTest>> {
    let patterns = DiscoveryPatterns::from_section(section)?;
    let rules = ClassifyRules::from_section(section);

    // Keyed by relative path: dedups and gives a stable order.
    let mut found: BTreeMap<String, CandidateTest> = BTreeMap::new();

    for (path, rel) in collect_matching_files(fs, &section.root, &patterns) {
        if found.contains_key(&rel) {
            continue;
        }

        let content = match fs.read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(file = %rel, error = %err, "skipping unreadable file");
                continue;
            }
        };

        let candidate = CandidateTest::new(rel.clone(), false);
        let classification = rules.classify(&candidate.file_name, &content);
        debug!(file = %rel, ?classification, "classified discovery match");

        found.insert(
            rel,
            CandidateTest {
                is_executable: classification.is_executable(),
                ..candidate
            },
        );
    }

    Ok(found.into_values().collect())
}
