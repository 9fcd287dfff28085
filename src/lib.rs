// src/lib.rs

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod model;
pub mod parse;
pub mod report;
pub mod types;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::engine::{Orchestrator, RunOptions, RunSummary, RunVerdict};
use crate::fs::RealFileSystem;

/// Exit code for a run whose success rate is below the threshold.
pub const EXIT_BELOW_THRESHOLD: i32 = 1;
/// Exit code for configuration or internal errors.
pub const EXIT_INTERNAL_ERROR: i32 = 2;
/// Exit code when discovery found nothing to run.
pub const EXIT_NO_TESTS: i32 = 3;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - discovery (or a dry-run listing)
/// - the orchestrator with the real process executor
/// - Ctrl-C handling
///
/// Returns `None` for a dry run.
pub async fn run(args: CliArgs) -> Result<Option<RunVerdict>> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    let options = apply_overrides(&mut cfg, &args);
    options.validate()?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(None);
    }

    let orchestrator = Orchestrator::with_process_executor(cfg)?;

    // Ctrl-C -> stop the run; in-flight test processes get terminated.
    {
        let stop = orchestrator.stop_handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            warn!("Ctrl+C received; stopping test run");
            stop.stop();
        });
    }

    let summary = orchestrator.run(options).await?;
    print_summary(&summary);
    Ok(Some(summary.verdict))
}

/// Process exit code for a verdict.
pub fn exit_code(verdict: RunVerdict) -> i32 {
    match verdict {
        RunVerdict::AllPassed | RunVerdict::Accepted { .. } => 0,
        RunVerdict::BelowThreshold { .. } => EXIT_BELOW_THRESHOLD,
        RunVerdict::NoTestsDiscovered => EXIT_NO_TESTS,
    }
}

/// Fold CLI flags into the loaded config and derive the run options.
pub fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> RunOptions {
    if let Some(dir) = &args.results_dir {
        cfg.report.results_dir = dir.clone();
    }

    let run = &mut cfg.run;
    if args.parallel {
        run.parallel = true;
    }
    if let Some(n) = args.max_concurrency {
        run.max_concurrency = n;
    }
    if let Some(ms) = args.timeout_ms {
        run.timeout_ms = ms;
    }
    if args.stop_on_failure {
        run.continue_on_failure = false;
    }
    if let Some(t) = args.threshold {
        run.acceptance_threshold = t;
    }

    let options = RunOptions::from_section(run);
    debug!(?options, "effective run options");
    options
}

fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let scanned = discovery::scan(&RealFileSystem, &cfg.discovery)?;
    let executable = scanned.iter().filter(|c| c.is_executable).count();

    println!("testherd dry-run");
    println!("  root = {}", cfg.discovery.root.display());
    println!("  patterns = {:?}", cfg.discovery.patterns);
    println!();
    println!("candidates ({executable} executable of {} matched):", scanned.len());
    for c in &scanned {
        let mark = if c.is_executable { "run " } else { "skip" };
        println!("  [{mark}] {}", c.file_path);
    }

    info!("dry-run complete (no execution)");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let s = &summary.report.execution_summary;
    println!();
    println!(
        "{} executed / {} discovered: {} passed, {} failed, {} errored, {} timed out ({}%)",
        s.total_tests,
        s.discovered_tests,
        s.passed,
        s.failed,
        s.errored,
        s.timed_out,
        s.success_rate_percent
    );
    if let Some(reason) = &s.stopped_early {
        println!("stopped early: {reason:?}");
    }
    for r in &summary.report.recommendations {
        println!("[{}] {}: {}", r.severity.as_str(), r.title, r.description);
    }
    for f in &summary.emitted.failures {
        println!("report '{}' not written: {}", f.emitter, f.error);
    }
    match summary.verdict {
        RunVerdict::NoTestsDiscovered => println!("no tests discovered"),
        RunVerdict::AllPassed => println!("all tests passed"),
        RunVerdict::Accepted { success_rate } => {
            println!("some tests failed; success rate {success_rate}% meets the threshold")
        }
        RunVerdict::BelowThreshold {
            success_rate,
            threshold,
        } => println!("some tests failed; success rate {success_rate}% is below {threshold}%"),
    }
}
