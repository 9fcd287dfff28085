// src/discovery/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::config::DiscoverySection;
use crate::fs::FileSystem;

/// Compiled include/exclude patterns plus the name-based filters of
/// `[discovery]`.
///
/// Patterns are relative to the discovery root; `matches` is given
/// `/`-separated relative paths such as `"tests/login.test.js"`.
#[derive(Clone)]
pub struct DiscoveryPatterns {
    include: GlobSet,
    exclude: Option<GlobSet>,
    exclude_names: Vec<String>,
    skip_dirs: Vec<String>,
}

impl fmt::Debug for DiscoveryPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryPatterns")
            .field("exclude_names", &self.exclude_names)
            .field("skip_dirs", &self.skip_dirs)
            .finish_non_exhaustive()
    }
}

impl DiscoveryPatterns {
    pub fn from_section(section: &DiscoverySection) -> Result<Self> {
        let include = build_globset(&section.patterns).context("building include globset")?;
        let exclude = if section.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&section.exclude).context("building exclude globset")?)
        };

        Ok(Self {
            include,
            exclude,
            exclude_names: lowercase_all(&section.exclude_names),
            skip_dirs: section.skip_dirs.clone(),
        })
    }

    /// Whether a file at `rel_path` is a discovery match (before any content
    /// classification).
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path).to_lowercase();
        !self
            .exclude_names
            .iter()
            .any(|needle| file_name.contains(needle.as_str()))
    }

    fn skips_dir(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.skip_dirs.iter().any(|s| s == name))
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collect all files under `root` matching `patterns`, as
/// `(full_path, relative_path)` pairs.
///
/// Directories that cannot be listed are skipped with a warning; a pattern
/// that matches nothing simply contributes nothing.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &DiscoveryPatterns,
) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                continue;
            }
        };

        for path in entries {
            if fs.is_dir(&path) {
                if patterns.skips_dir(&path) {
                    debug!(dir = %path.display(), "not descending into skipped directory");
                } else {
                    stack.push(path);
                }
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_path(root, &path) {
                    if patterns.matches(&rel) {
                        files.push((path, rel));
                    }
                }
            }
        }
    }

    files
}

/// `/`-separated path of `path` relative to `root`, without a leading `./`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let rel = rel.to_string_lossy().replace('\\', "/");
    let rel = rel.trim_start_matches("./").to_string();
    (!rel.is_empty()).then_some(rel)
}
