// tests/aggregator.rs

mod common;
use crate::common::builders::{OutcomeBuilder, cancelled, failed, passed, t0};

use chrono::Duration;
use proptest::prelude::*;
use testherd::aggregate::{AggregateInput, CategoryRules, FALLBACK_CATEGORY, aggregate};
use testherd::config::CategoryRuleConfig;
use testherd::model::{AggregatedReport, ExecutionOutcome, ExecutionStatus, HaltReason, Severity};

fn run(outcomes: &[ExecutionOutcome]) -> AggregatedReport {
    let rules = CategoryRules::default();
    aggregate(AggregateInput {
        outcomes,
        discovered_tests: outcomes.len(),
        start_time: t0(),
        end_time: t0() + Duration::seconds(3),
        stopped_early: None,
        rules: &rules,
    })
}

fn with_duration(file: &str, ms: u64) -> ExecutionOutcome {
    OutcomeBuilder::new(file, ExecutionStatus::Passed).duration_ms(ms).build()
}

#[test]
fn summary_counts_each_status() {
    let outcomes = vec![
        passed("tests/a.js"),
        passed("tests/b.js"),
        failed("tests/c.js"),
        OutcomeBuilder::new("tests/d.js", ExecutionStatus::Errored).build(),
        OutcomeBuilder::new("tests/e.js", ExecutionStatus::TimedOut).build(),
    ];
    let report = run(&outcomes);
    let s = &report.execution_summary;

    assert_eq!(s.total_tests, 5);
    assert_eq!((s.passed, s.failed, s.errored, s.timed_out), (2, 1, 1, 1));
    assert_eq!(s.success_rate_percent, 40);
    assert_eq!(s.total_duration_ms, 3000);
    assert_eq!(report.outcomes, outcomes);
}

#[test]
fn empty_run_has_zero_rate_and_no_recommendations() {
    let report = run(&[]);
    assert_eq!(report.execution_summary.total_tests, 0);
    assert_eq!(report.execution_summary.success_rate_percent, 0);
    assert!(report.categories.is_empty());
    assert!(report.recommendations.is_empty());
    assert_eq!(report.performance.mean_duration_ms, 0.0);
}

#[test]
fn halt_reason_is_carried_into_summary() {
    let rules = CategoryRules::default();
    let halt = HaltReason::Cancelled;
    let outcomes = [passed("a.js")];
    let report = aggregate(AggregateInput {
        outcomes: &outcomes,
        discovered_tests: 4,
        start_time: t0(),
        end_time: t0(),
        stopped_early: Some(&halt),
        rules: &rules,
    });
    assert_eq!(report.execution_summary.discovered_tests, 4);
    assert_eq!(report.execution_summary.stopped_early, Some(HaltReason::Cancelled));
}

#[test]
fn categories_follow_rule_order_with_fallback_last() {
    let outcomes = vec![
        passed("tests/zzz-misc.js"),
        failed("tests/user-login.js"),
        passed("tests/api-users.js"),
        passed("tests/Auth-Token.js"),
        passed("tests/main-menu.js"),
    ];
    let report = run(&outcomes);

    let names: Vec<_> = report.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["API", "Authentication", "Navigation", FALLBACK_CATEGORY]);

    let auth = &report.categories[1];
    assert_eq!((auth.total, auth.passed, auth.failed), (2, 1, 1));
    assert_eq!(auth.success_rate_percent, 50);
}

#[test]
fn configured_category_rules_replace_defaults() {
    let rules = CategoryRules::from_config(&[CategoryRuleConfig {
        keyword: "CHECKOUT".to_string(),
        name: "Payments".to_string(),
    }]);
    assert_eq!(rules.categorize("checkout-flow.js"), "Payments");
    assert_eq!(rules.categorize("api-users.js"), FALLBACK_CATEGORY);
    assert_eq!(CategoryRules::from_config(&[]), CategoryRules::default());
}

#[test]
fn no_slow_outcomes_when_durations_are_close() {
    let outcomes: Vec<_> = [100, 120, 90, 110]
        .iter()
        .enumerate()
        .map(|(i, ms)| with_duration(&format!("t{i}.js"), *ms))
        .collect();
    let report = run(&outcomes);

    assert!(report.performance.slow_outcomes.is_empty());
    assert_eq!(report.performance.min_duration_ms, 90);
    assert_eq!(report.performance.max_duration_ms, 120);
    assert!(report.recommendations.iter().all(|r| r.severity != Severity::Info));
}

#[test]
fn single_five_x_outlier_is_slow() {
    let outcomes = vec![
        with_duration("a.js", 100),
        with_duration("b.js", 100),
        with_duration("c.js", 100),
        with_duration("d.js", 100),
        with_duration("outlier.js", 500),
    ];
    let report = run(&outcomes);

    // mean = 180, 500 > 360
    assert_eq!(report.performance.mean_duration_ms, 180.0);
    let slow: Vec<_> = report
        .performance
        .slow_outcomes
        .iter()
        .map(|s| s.test_file.as_str())
        .collect();
    assert_eq!(slow, vec!["outlier.js"]);

    let info = report
        .recommendations
        .iter()
        .find(|r| r.severity == Severity::Info)
        .unwrap();
    assert_eq!(info.affected_tests, vec!["outlier.js"]);
}

#[test]
fn recommendations_are_sorted_by_severity_then_rule_order() {
    let outcomes = vec![
        OutcomeBuilder::new("t1.js", ExecutionStatus::TimedOut).build(),
        failed("f1.js"),
        OutcomeBuilder::new("e1.js", ExecutionStatus::Errored).build(),
        failed("f2.js"),
        passed("p1.js"),
    ];
    let report = run(&outcomes);

    let severities: Vec<_> = report.recommendations.iter().map(|r| r.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::Error, Severity::Error, Severity::Warning, Severity::Warning]
    );
    assert_eq!(report.recommendations[0].affected_tests, vec!["f1.js", "f2.js"]);
    assert_eq!(report.recommendations[1].affected_tests, vec!["e1.js"]);
    assert_eq!(report.recommendations[2].affected_tests, vec!["t1.js"]);
    assert!(report.recommendations[3].description.contains("20%"));
}

#[test]
fn stopped_tests_are_not_blamed_on_the_environment() {
    let outcomes = vec![
        passed("a.js"),
        cancelled("b.js"),
        cancelled("c.js"),
        OutcomeBuilder::new("d.js", ExecutionStatus::Errored).build(),
    ];
    let report = run(&outcomes);

    let env = report
        .recommendations
        .iter()
        .find(|r| r.title == "Check the test environment")
        .unwrap();
    assert_eq!(env.affected_tests, vec!["d.js"]);

    let interrupted = report
        .recommendations
        .iter()
        .find(|r| r.title == "Re-run interrupted tests")
        .unwrap();
    assert_eq!(interrupted.severity, Severity::Info);
    assert_eq!(interrupted.affected_tests, vec!["b.js", "c.js"]);
    assert_eq!(report.execution_summary.errored, 3);
}

#[test]
fn run_stopped_before_any_real_error_has_no_environment_warning() {
    let report = run(&[passed("a.js"), cancelled("b.js")]);
    assert!(
        report
            .recommendations
            .iter()
            .all(|r| r.title != "Check the test environment")
    );
}

#[test]
fn all_passed_run_has_no_recommendations() {
    let report = run(&[passed("a.js"), passed("b.js")]);
    assert_eq!(report.execution_summary.success_rate_percent, 100);
    assert!(report.recommendations.is_empty());
}

fn status_strategy() -> impl Strategy<Value = ExecutionStatus> {
    prop_oneof![
        Just(ExecutionStatus::Passed),
        Just(ExecutionStatus::Failed),
        Just(ExecutionStatus::Errored),
        Just(ExecutionStatus::TimedOut),
    ]
}

fn outcome_strategy() -> impl Strategy<Value = ExecutionOutcome> {
    let names = prop::sample::select(vec![
        "api-users", "login", "form-submit", "nav-bar", "perf-home", "page-layout", "e2e-checkout",
        "misc",
    ]);
    (names, 0u32..1000, status_strategy(), 0u64..10_000).prop_map(|(name, n, status, ms)| {
        OutcomeBuilder::new(&format!("tests/{name}-{n}.js"), status)
            .duration_ms(ms)
            .build()
    })
}

proptest! {
    #[test]
    fn counters_and_buckets_are_consistent(outcomes in prop::collection::vec(outcome_strategy(), 0..50)) {
        let report = run(&outcomes);
        let s = &report.execution_summary;

        prop_assert_eq!(s.total_tests, outcomes.len());
        prop_assert_eq!(s.passed + s.failed + s.errored + s.timed_out, s.total_tests);
        prop_assert!(s.success_rate_percent <= 100);

        let bucket_total: usize = report.categories.iter().map(|c| c.total).sum();
        prop_assert_eq!(bucket_total, s.total_tests);
        for c in &report.categories {
            prop_assert!(c.total > 0);
            prop_assert_eq!(c.passed + c.failed + c.errored + c.timed_out, c.total);
        }

        let mean = report.performance.mean_duration_ms;
        for slow in &report.performance.slow_outcomes {
            prop_assert!(slow.duration_ms as f64 > 2.0 * mean);
        }

        let sev: Vec<_> = report.recommendations.iter().map(|r| r.severity).collect();
        let mut sorted = sev.clone();
        sorted.sort();
        prop_assert_eq!(sev, sorted);
    }
}
