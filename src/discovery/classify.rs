// src/discovery/classify.rs

//! Content-based classification of discovered files.
//!
//! File names in real test suites are inconsistent, so both checks look at
//! content first: a file is a runnable test program only if it shows an entry
//! point and does not look like a shared module.

use crate::config::DiscoverySection;

/// Why a file was (or was not) classified as executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Executable { entry_marker: String },
    NoEntryPoint,
    UtilityModule { signal: String },
    HelperName { name: String },
}

impl Classification {
    pub fn is_executable(&self) -> bool {
        matches!(self, Classification::Executable { .. })
    }
}

/// Ordered marker tables used by [`ClassifyRules::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRules {
    pub entry_markers: Vec<String>,
    pub utility_markers: Vec<String>,
    pub helper_names: Vec<String>,
}

impl ClassifyRules {
    pub fn from_section(section: &DiscoverySection) -> Self {
        Self {
            entry_markers: non_empty(&section.entry_markers),
            utility_markers: non_empty(&section.utility_markers),
            helper_names: section
                .helper_names
                .iter()
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Classify a file given its name and content.
    ///
    /// Order: helper-name signal, then utility-content signal, then entry
    /// marker. Utility signals win over entry markers because shared modules
    /// often carry a self-test guard as well.
    pub fn classify(&self, file_name: &str, content: &str) -> Classification {
        let stem = file_name
            .rsplit_once('.')
            .map(|(s, _)| s)
            .unwrap_or(file_name)
            .to_lowercase();
        if let Some(name) = self.helper_names.iter().find(|n| names_helper(&stem, n)) {
            return Classification::HelperName { name: name.clone() };
        }

        let normalized = normalize_whitespace(content);
        if let Some(signal) = self
            .utility_markers
            .iter()
            .find(|m| normalized.contains(normalize_whitespace(m).as_str()))
        {
            return Classification::UtilityModule {
                signal: signal.clone(),
            };
        }

        match self
            .entry_markers
            .iter()
            .find(|m| normalized.contains(normalize_whitespace(m).as_str()))
        {
            Some(marker) => Classification::Executable {
                entry_marker: marker.clone(),
            },
            None => Classification::NoEntryPoint,
        }
    }
}

/// `stem` is the helper name itself or ends in it after a separator
/// (`utils`, `test-utils`, `api_helper`), but `config-page` is not `config`.
fn names_helper(stem: &str, name: &str) -> bool {
    stem == name
        || stem
            .strip_suffix(name)
            .is_some_and(|prefix| prefix.ends_with(['-', '_', '.']))
}

fn non_empty(items: &[String]) -> Vec<String> {
    items.iter().filter(|s| !s.trim().is_empty()).cloned().collect()
}

/// Collapse runs of whitespace to a single space so `module.exports  =  {`
/// matches the `module.exports = {` marker.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
