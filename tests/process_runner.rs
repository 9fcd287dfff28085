// tests/process_runner.rs

#![cfg(unix)]

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{TestResult, init_tracing, sh_script, with_timeout};

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use testherd::engine::stop_channel;
use testherd::exec::{ExecutorBackend, ProcessExecutor};
use testherd::model::{CandidateTest, ExecutionOutcome, ExecutionStatus};

fn write_test(root: &Path, rel: &str, body: &str) -> CandidateTest {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, body).unwrap();
    CandidateTest::new(rel, true)
}

fn ran(outcome: Option<ExecutionOutcome>) -> ExecutionOutcome {
    outcome.expect("candidate was not started")
}

const GRACE: Duration = Duration::from_millis(500);

fn executor_for(root: &Path) -> ProcessExecutor {
    let cfg = ConfigFileBuilder::new().root(root).build();
    ProcessExecutor::from_config(&cfg)
        .unwrap()
        .with_grace_period(GRACE)
}

#[tokio::test]
async fn exit_zero_within_timeout_is_passed() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let candidate = write_test(dir.path(), "tests/ok.sh", &sh_script("3 tests 3 passed 0 failed", 0));
    let (_stop, signal) = stop_channel();

    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_secs(10), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::Passed);
    assert_eq!(outcome.exit_code, Some(0));
    assert!(outcome.stdout.contains("3 tests 3 passed 0 failed"));
    assert!(!outcome.cancelled);
    assert!(outcome.end_time >= outcome.start_time);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_failed_with_code() -> TestResult {
    let dir = TempDir::new()?;
    let candidate = write_test(
        dir.path(),
        "tests/bad.sh",
        "#!/bin/sh\necho 'Error: login button missing' >&2\nexit 3\n",
    );
    let (_stop, signal) = stop_channel();

    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_secs(10), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::Failed);
    assert_eq!(outcome.exit_code, Some(3));
    assert!(outcome.stderr.contains("login button missing"));
    Ok(())
}

#[tokio::test]
async fn exceeding_the_timeout_is_timed_out() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let candidate = write_test(dir.path(), "tests/slow.sh", "#!/bin/sh\necho started\nsleep 30\nexit 0\n");
    let (_stop, signal) = stop_channel();

    let started = std::time::Instant::now();
    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_millis(300), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert_eq!(outcome.exit_code, None);
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn process_ignoring_sigterm_is_killed_after_grace() -> TestResult {
    let dir = TempDir::new()?;
    let candidate = write_test(
        dir.path(),
        "tests/stubborn.sh",
        "#!/bin/sh\ntrap '' TERM\nwhile true; do sleep 0.1; done\n",
    );
    let (_stop, signal) = stop_channel();

    let started = std::time::Instant::now();
    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_millis(200), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert_eq!(outcome.exit_code, None);
    // Only SIGKILL ends it, and that is sent once the grace period has run out.
    assert!(started.elapsed() >= Duration::from_millis(200) + GRACE);
    Ok(())
}

#[tokio::test]
async fn clean_exit_after_timeout_signal_is_still_timed_out() -> TestResult {
    let dir = TempDir::new()?;
    let candidate = write_test(
        dir.path(),
        "tests/polite.sh",
        "#!/bin/sh\ntrap 'exit 0' TERM\nsleep 30\n",
    );
    let (_stop, signal) = stop_channel();

    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_millis(200), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::TimedOut);
    assert_eq!(outcome.exit_code, None);
    assert!(!outcome.cancelled);
    Ok(())
}

#[tokio::test]
async fn stop_request_terminates_running_process() -> TestResult {
    let dir = TempDir::new()?;
    let candidate = write_test(dir.path(), "tests/long.sh", "#!/bin/sh\nsleep 30\n");
    let (stop, signal) = stop_channel();

    let executor = executor_for(dir.path());
    let run = tokio::spawn(executor.execute(candidate, Duration::from_secs(60), signal));
    tokio::time::sleep(Duration::from_millis(200)).await;
    stop.stop();

    let outcome = ran(with_timeout(run).await?);
    assert_eq!(outcome.status, ExecutionStatus::Errored);
    assert!(outcome.cancelled);
    assert_eq!(outcome.exit_code, None);
    Ok(())
}

#[tokio::test]
async fn missing_program_is_errored() -> TestResult {
    let dir = TempDir::new()?;
    // No interpreter for `.bin`, and the file does not exist.
    let candidate = CandidateTest::new("tests/missing.bin", true);
    let (_stop, signal) = stop_channel();

    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_secs(5), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::Errored);
    assert_eq!(outcome.exit_code, None);
    assert!(outcome.stderr.contains("failed to spawn"));
    Ok(())
}

#[tokio::test]
async fn large_output_keeps_the_tail_and_flags_truncation() -> TestResult {
    let dir = TempDir::new()?;
    let body = "#!/bin/sh\ni=0\nwhile [ $i -lt 2000 ]; do echo \"line $i padding padding padding\"; i=$((i+1)); done\necho 'FINAL: 5 tests 5 passed 0 failed'\n";
    let candidate = write_test(dir.path(), "tests/chatty.sh", body);
    let (_stop, signal) = stop_channel();

    let cfg = ConfigFileBuilder::new()
        .root(dir.path())
        .max_output_bytes(4096)
        .build();
    let executor = ProcessExecutor::from_config(&cfg)?;
    let outcome = ran(with_timeout(executor.execute(candidate, Duration::from_secs(10), signal)).await);

    assert_eq!(outcome.status, ExecutionStatus::Passed);
    assert!(outcome.stdout_truncated);
    assert!(!outcome.stderr_truncated);
    assert!(outcome.stdout.len() <= 4096);
    assert!(outcome.stdout.trim_end().ends_with("FINAL: 5 tests 5 passed 0 failed"));
    Ok(())
}

#[tokio::test]
async fn test_process_sees_configured_environment() -> TestResult {
    let dir = TempDir::new()?;
    let candidate = write_test(
        dir.path(),
        "tests/env.sh",
        "#!/bin/sh\necho \"ctx=$TESTHERD_CONTEXT node_env=$NODE_ENV cwd=$(pwd)\"\n",
    );
    let (_stop, signal) = stop_channel();

    let outcome = ran(with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_secs(10), signal)).await);

    assert!(outcome.stdout.contains("ctx=test"));
    assert!(outcome.stdout.contains("node_env=test"));
    let dir_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(outcome.stdout.trim_end().ends_with(&dir_name));
    Ok(())
}

#[tokio::test]
async fn already_stopped_candidate_is_never_spawned() -> TestResult {
    let dir = TempDir::new()?;
    let marker = dir.path().join("spawned");
    let candidate = write_test(dir.path(), "tests/touch.sh", "#!/bin/sh\ntouch spawned\n");
    let (stop, signal) = stop_channel();
    stop.stop();

    let outcome = with_timeout(executor_for(dir.path()).execute(candidate, Duration::from_secs(5), signal)).await;

    assert!(outcome.is_none());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!marker.exists());
    Ok(())
}
