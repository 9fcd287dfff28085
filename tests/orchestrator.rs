// tests/orchestrator.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, candidates, failed, passed, t0};
use crate::common::fake_executor::{Script, ScriptedExecutor};
use crate::common::{MockFileSystem, RUNNABLE_JS, TestResult, init_tracing, with_timeout};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use testherd::aggregate::{AggregateInput, CategoryRules, aggregate};
use testherd::engine::{Orchestrator, OrchestratorState, RunOptions, RunVerdict};
use testherd::errors::TestherdError;
use testherd::model::{ExecutionOutcome, ExecutionStatus, ExecutionSummary, HaltReason};
use testherd::report::LiveSnapshot;
use testherd::types::ReportFormat;

fn mock_suite(files: &[&str]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for f in files {
        fs.add_file(format!("./tests/{f}"), RUNNABLE_JS);
    }
    fs
}

fn orchestrator(fs: &MockFileSystem, executor: ScriptedExecutor) -> Orchestrator<ScriptedExecutor> {
    let cfg = ConfigFileBuilder::new().results_dir("out").build();
    Orchestrator::new(cfg, Arc::new(fs.clone()), executor)
}

#[tokio::test]
async fn full_run_discovers_executes_and_reports() -> TestResult {
    init_tracing();
    let fs = mock_suite(&["api-users.js", "login.js", "menu.js"]);
    let executor = ScriptedExecutor::default().script("tests/login.js", Script::fail());
    let orch = orchestrator(&fs, executor.clone());

    let summary = with_timeout(orch.run(RunOptions::default())).await?;
    let s = &summary.report.execution_summary;

    assert_eq!(s.discovered_tests, 3);
    assert_eq!(s.total_tests, 3);
    assert_eq!((s.passed, s.failed), (2, 1));
    assert_eq!(summary.waves, 3);
    assert_eq!(
        executor.started(),
        vec!["tests/api-users.js", "tests/login.js", "tests/menu.js"]
    );
    assert_eq!(
        summary.verdict,
        RunVerdict::BelowThreshold {
            success_rate: 67,
            threshold: 90
        }
    );

    assert!(summary.emitted.is_complete());
    for name in ["test-report.json", "test-results.csv", "test-report.html", "live-snapshot.json"] {
        assert!(fs.contents(Path::new("out").join(name)).is_some(), "{name} missing");
    }
    let snapshot: LiveSnapshot = serde_json::from_slice(&fs.contents("out/live-snapshot.json").unwrap())?;
    assert_eq!(snapshot.tests.len(), 3);
    assert_eq!(orch.state(), OrchestratorState::Idle);
    Ok(())
}

#[tokio::test]
async fn second_concurrent_run_is_rejected() -> TestResult {
    init_tracing();
    let fs = mock_suite(&["slow.js"]);
    let orch = Arc::new(orchestrator(&fs, ScriptedExecutor::new(Script::hang())));

    let first = {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move { orch.run(RunOptions::default()).await })
    };

    with_timeout(async {
        while orch.state() != OrchestratorState::Running {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    let second = orch.run(RunOptions::default()).await;
    assert!(matches!(second, Err(TestherdError::AlreadyRunning)));

    orch.stop();
    let summary = with_timeout(first).await??;
    assert_eq!(summary.report.execution_summary.stopped_early, Some(HaltReason::Cancelled));
    assert_eq!(summary.report.outcomes[0].status, ExecutionStatus::Errored);
    assert!(summary.report.outcomes[0].cancelled);
    assert_eq!(orch.state(), OrchestratorState::Idle);

    // The orchestrator is reusable once idle.
    let again = orch
        .run(RunOptions {
            timeout: Duration::from_millis(50),
            ..RunOptions::default()
        })
        .await?;
    assert_eq!(again.report.outcomes[0].status, ExecutionStatus::TimedOut);
    Ok(())
}

#[tokio::test]
async fn stop_while_idle_does_not_affect_next_run() -> TestResult {
    let fs = mock_suite(&["a.js"]);
    let orch = orchestrator(&fs, ScriptedExecutor::default());

    orch.stop();
    let summary = with_timeout(orch.run(RunOptions::default())).await?;

    assert_eq!(summary.verdict, RunVerdict::AllPassed);
    assert_eq!(summary.report.execution_summary.stopped_early, None);
    Ok(())
}

#[tokio::test]
async fn empty_suite_reports_no_tests() -> TestResult {
    let fs = MockFileSystem::new();
    let orch = orchestrator(&fs, ScriptedExecutor::default());

    let summary = with_timeout(orch.run(RunOptions::default())).await?;

    assert_eq!(summary.verdict, RunVerdict::NoTestsDiscovered);
    assert_eq!(testherd::exit_code(summary.verdict), testherd::EXIT_NO_TESTS);
    assert!(fs.contents("out/test-report.json").is_some());
    Ok(())
}

#[tokio::test]
async fn run_candidates_skips_discovery() -> TestResult {
    let fs = MockFileSystem::new();
    let executor = ScriptedExecutor::default().script("x.js", Script::fail());
    let orch = orchestrator(&fs, executor);

    let options = RunOptions {
        parallel: true,
        max_concurrency: 2,
        acceptance_threshold: 50,
        ..RunOptions::default()
    };
    let summary = with_timeout(orch.run_candidates(candidates(&["w.js", "x.js", "y.js", "z.js"]), options)).await?;

    assert_eq!(summary.waves, 2);
    assert_eq!(summary.verdict, RunVerdict::Accepted { success_rate: 75 });
    assert_eq!(testherd::exit_code(summary.verdict), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_options_are_rejected_before_running() {
    let fs = mock_suite(&["a.js"]);
    let executor = ScriptedExecutor::default();
    let orch = orchestrator(&fs, executor.clone());

    let result = orch
        .run(RunOptions {
            timeout: Duration::ZERO,
            ..RunOptions::default()
        })
        .await;

    assert!(matches!(result, Err(TestherdError::ConfigError(_))));
    assert!(executor.started().is_empty());
    assert_eq!(orch.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn failing_report_write_is_collected_not_fatal() -> TestResult {
    let fs = mock_suite(&["a.js"]);
    fs.fail_writes_to("out/test-report.html");
    let cfg = ConfigFileBuilder::new()
        .results_dir("out")
        .formats(&[ReportFormat::Html, ReportFormat::Json])
        .live_updates(false)
        .build();
    let orch = Orchestrator::new(cfg, Arc::new(fs.clone()), ScriptedExecutor::default());

    let summary = with_timeout(orch.run(RunOptions::default())).await?;

    assert_eq!(summary.emitted.failures.len(), 1);
    assert_eq!(summary.emitted.failures[0].emitter, "html");
    assert!(fs.contents("out/test-report.json").is_some());
    assert!(fs.contents("out/live-snapshot.json").is_none());
    Ok(())
}

fn summary_of(outcomes: &[ExecutionOutcome], discovered: usize) -> ExecutionSummary {
    let rules = CategoryRules::default();
    aggregate(AggregateInput {
        outcomes,
        discovered_tests: discovered,
        start_time: t0(),
        end_time: t0(),
        stopped_early: None,
        rules: &rules,
    })
    .execution_summary
}

#[test]
fn verdict_distinguishes_outcomes() {
    let all = summary_of(&[passed("a"), passed("b")], 2);
    assert_eq!(RunVerdict::evaluate(&all, 90), RunVerdict::AllPassed);

    let mut nine = vec![passed("p"); 9];
    nine.push(failed("f"));
    let mostly = summary_of(&nine, 10);
    assert_eq!(RunVerdict::evaluate(&mostly, 90), RunVerdict::Accepted { success_rate: 90 });
    assert_eq!(
        RunVerdict::evaluate(&mostly, 95),
        RunVerdict::BelowThreshold {
            success_rate: 90,
            threshold: 95
        }
    );

    let none = summary_of(&[], 0);
    assert_eq!(RunVerdict::evaluate(&none, 90), RunVerdict::NoTestsDiscovered);
    assert_eq!(
        testherd::exit_code(RunVerdict::evaluate(&mostly, 95)),
        testherd::EXIT_BELOW_THRESHOLD
    );
}
