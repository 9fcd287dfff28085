// src/aggregate/categories.rs

//! Keyword-based categorisation of test files.

use crate::config::CategoryRuleConfig;

/// Bucket for files no rule matches.
pub const FALLBACK_CATEGORY: &str = "Other";

const DEFAULT_RULES: &[(&str, &str)] = &[
    ("api", "API"),
    ("login", "Authentication"),
    ("auth", "Authentication"),
    ("form", "Forms"),
    ("nav", "Navigation"),
    ("menu", "Navigation"),
    ("route", "Navigation"),
    ("perf", "Performance"),
    ("load", "Performance"),
    ("ui", "UI"),
    ("page", "UI"),
    ("layout", "UI"),
    ("visual", "UI"),
    ("e2e", "Integration"),
    ("flow", "Integration"),
    ("integration", "Integration"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryRule {
    keyword: String,
    name: String,
}

/// Ordered keyword -> category table. First match wins; matching is a
/// case-insensitive substring test on the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.iter().map(|(k, n)| (k.to_string(), n.to_string())))
    }
}

impl CategoryRules {
    pub fn new(rules: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(keyword, name)| CategoryRule {
                    keyword: keyword.to_lowercase(),
                    name,
                })
                .collect(),
        }
    }

    /// Rules from `[[category]]`; the built-in table when none are configured.
    pub fn from_config(rules: &[CategoryRuleConfig]) -> Self {
        if rules.is_empty() {
            return Self::default();
        }
        Self::new(rules.iter().map(|r| (r.keyword.clone(), r.name.clone())))
    }

    pub fn categorize(&self, file_name: &str) -> &str {
        let lower = file_name.to_lowercase();
        self.rules
            .iter()
            .find(|r| lower.contains(&r.keyword))
            .map_or(FALLBACK_CATEGORY, |r| r.name.as_str())
    }

    /// Distinct category names in rule order, with the fallback last.
    pub fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !names.contains(&rule.name.as_str()) {
                names.push(&rule.name);
            }
        }
        if !names.contains(&FALLBACK_CATEGORY) {
            names.push(FALLBACK_CATEGORY);
        }
        names
    }
}
