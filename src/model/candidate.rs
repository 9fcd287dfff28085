// src/model/candidate.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A discovered file believed to be a standalone executable test program.
///
/// `file_path` is relative to the discovery root, always uses `/` as the
/// separator, and is the identity key of the candidate within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTest {
    pub file_path: String,
    pub file_name: String,
    pub is_executable: bool,
}

impl CandidateTest {
    pub fn new(file_path: impl Into<String>, is_executable: bool) -> Self {
        let file_path = file_path.into().replace('\\', "/");
        let file_name = file_path
            .rsplit('/')
            .next()
            .unwrap_or(file_path.as_str())
            .to_string();
        Self {
            file_path,
            file_name,
            is_executable,
        }
    }

    /// File extension without the dot, lowercased (e.g. `"js"`).
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}
