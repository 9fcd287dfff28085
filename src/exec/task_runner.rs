// src/exec/task_runner.rs

//! Running a single candidate as a child process.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::engine::CancelSignal;
use crate::exec::capture::{OutputCapture, finish_optional};
use crate::exec::command::{RunnerPolicy, build_command};
use crate::exec::terminate::{TerminateResult, reap_process_group, terminate_child};
use crate::model::{CandidateTest, ExecutionOutcome, ProcessEnd};

/// Run `candidate` to completion, timeout or cancellation.
///
/// Always spawns; checking for an earlier stop request is the caller's job
/// (see [`crate::exec::ProcessExecutor`]). Never fails: a process that cannot
/// be started yields an `errored` outcome. The returned outcome carries raw output only; parsing is done by
/// the caller.
pub async fn run_candidate(
    candidate: CandidateTest,
    policy: Arc<RunnerPolicy>,
    timeout: Duration,
    mut cancel: CancelSignal,
) -> ExecutionOutcome {
    let start_time = Utc::now();
    let started = Instant::now();

    let mut cmd = match build_command(&candidate, &policy) {
        Ok(cmd) => cmd,
        Err(err) => {
            warn!(test = %candidate.file_path, error = %err, "cannot build test command");
            return ExecutionOutcome::errored(&candidate, start_time, format!("{err:#}"));
        }
    };

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(test = %candidate.file_path, error = %err, "failed to spawn test process");
            return ExecutionOutcome::errored(
                &candidate,
                start_time,
                format!("failed to spawn '{}': {err}", candidate.file_path),
            );
        }
    };

    let pid = child.id();
    info!(test = %candidate.file_path, pid, timeout_ms = timeout.as_millis() as u64, "test process started");

    let stdout = child
        .stdout
        .take()
        .map(|out| OutputCapture::spawn(out, policy.max_output_bytes));
    let stderr = child
        .stderr
        .take()
        .map(|err| OutputCapture::spawn(err, policy.max_output_bytes));

    // The child either exits on its own, runs out of time, or is stopped.
    let end = tokio::select! {
        status = child.wait() => {
            reap_process_group(pid);
            match status {
                Ok(status) => ProcessEnd::Exited(status.code()),
                Err(err) => ProcessEnd::SpawnFailed(format!("waiting for test process: {err}")),
            }
        }
        _ = tokio::time::sleep(timeout) => {
            warn!(test = %candidate.file_path, pid, timeout_ms = timeout.as_millis() as u64, "test timed out; terminating");
            let how = terminate_child(&mut child, pid, policy.grace_period).await;
            debug!(test = %candidate.file_path, ?how, "timed-out process terminated");
            ProcessEnd::TimedOut
        }
        _ = cancel.cancelled() => {
            info!(test = %candidate.file_path, pid, "stop requested; terminating test process");
            if terminate_child(&mut child, pid, policy.grace_period).await == TerminateResult::Killed {
                debug!(test = %candidate.file_path, "process needed a forced kill");
            }
            ProcessEnd::Cancelled
        }
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    let end_time = Utc::now();

    let stdout = finish_optional(stdout, policy.leak_window).await;
    let stderr = finish_optional(stderr, policy.leak_window).await;

    let mut outcome = ExecutionOutcome::from_end(&candidate, &end, start_time, end_time, duration_ms);
    outcome.stdout = stdout.text;
    outcome.stdout_truncated = stdout.truncated;
    if !stderr.text.is_empty() {
        if !outcome.stderr.is_empty() {
            outcome.stderr.push('\n');
        }
        outcome.stderr.push_str(&stderr.text);
    }
    outcome.stderr_truncated = stderr.truncated;

    info!(
        test = %candidate.file_path,
        status = %outcome.status,
        exit_code = ?outcome.exit_code,
        duration_ms,
        "test process finished"
    );

    outcome
}
