// src/config/mod.rs

//! Configuration: TOML model, loading, and validation.
//!
//! `RawConfigFile` is what `serde` produces; `ConfigFile` is the validated
//! form every other module consumes.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    CategoryRuleConfig, ConfigFile, DiscoverySection, RawConfigFile, ReportSection,
    RunSection, RunnerSection,
};
pub use validate::validate_run_limits;
