// src/exec/command.rs

//! Turning a candidate into a `tokio::process::Command`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::config::ConfigFile;
use crate::exec::terminate::TERMINATION_GRACE_PERIOD;
use crate::model::CandidateTest;

/// Environment variable marking every process we start as a test execution.
pub const CONTEXT_ENV_VAR: &str = "TESTHERD_CONTEXT";

/// How long output pipes may stay open after the test process exited.
pub const DEFAULT_LEAK_WINDOW: Duration = Duration::from_millis(500);

/// Everything the process runner needs besides the candidate itself.
#[derive(Debug, Clone)]
pub struct RunnerPolicy {
    /// Absolute discovery root; working directory of every test process.
    pub root: PathBuf,
    pub env: BTreeMap<String, String>,
    /// Lowercased extension -> launcher command line.
    pub interpreters: BTreeMap<String, String>,
    pub max_output_bytes: usize,
    pub grace_period: Duration,
    pub leak_window: Duration,
}

impl RunnerPolicy {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let root = std::path::absolute(&cfg.discovery.root).with_context(|| {
            format!(
                "resolving discovery root {}",
                cfg.discovery.root.display()
            )
        })?;

        Ok(Self {
            root,
            env: cfg.runner.env.clone(),
            interpreters: cfg
                .runner
                .interpreters
                .iter()
                .map(|(ext, cmd)| (ext.trim_start_matches('.').to_ascii_lowercase(), cmd.clone()))
                .collect(),
            max_output_bytes: cfg.runner.max_output_bytes,
            grace_period: TERMINATION_GRACE_PERIOD,
            leak_window: DEFAULT_LEAK_WINDOW,
        })
    }

    /// Launcher for `candidate`, if its extension has one configured.
    pub fn interpreter_for(&self, candidate: &CandidateTest) -> Option<&str> {
        let ext = candidate.extension()?;
        self.interpreters.get(&ext).map(String::as_str)
    }
}

/// Build the command for `candidate`: inherited environment plus the
/// configured overrides, piped stdout/stderr, null stdin, own process group.
pub fn build_command(candidate: &CandidateTest, policy: &RunnerPolicy) -> Result<Command> {
    let script = policy.root.join(&candidate.file_path);

    let mut cmd = match policy.interpreter_for(candidate) {
        Some(launcher) => {
            let mut parts = launcher.split_whitespace();
            let program = parts
                .next()
                .with_context(|| format!("empty launcher for '{}'", candidate.file_path))?;
            let mut c = Command::new(program);
            c.args(parts).arg(&script);
            c
        }
        None => Command::new(&script),
    };

    cmd.current_dir(&policy.root)
        .envs(&policy.env)
        .env(CONTEXT_ENV_VAR, "test")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so termination reaches everything the test spawned.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.as_std_mut().process_group(0);
    }

    Ok(cmd)
}
