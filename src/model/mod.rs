// src/model/mod.rs

//! Data model shared by every stage of a run.
//!
//! - [`candidate`]: what discovery produces.
//! - [`outcome`]: what the process runner and output parser produce.
//! - [`report`]: what the aggregator produces and the emitters serialise.

pub mod candidate;
pub mod outcome;
pub mod report;

pub use candidate::CandidateTest;
pub use outcome::{
    ExecutionOutcome, ExecutionStatus, ParsedStats, PartialStats, ProcessEnd, percent,
};
pub use report::{
    AggregatedReport, CategoryBucket, ExecutionSummary, HaltReason, PerformanceStats,
    Recommendation, Severity, SlowOutcome,
};
