use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use testherd::engine::CancelSignal;
use testherd::exec::{ExecutorBackend, OutcomeFuture};
use testherd::model::{CandidateTest, ExecutionOutcome, ProcessEnd};

/// What a scripted candidate does when "run".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behaviour {
    /// Exit with this code after the configured delay.
    Exit(i32),
    /// Never finish on its own: ends only by timeout or stop request.
    Hang,
    /// The executor task panics.
    Panic,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub behaviour: Behaviour,
    pub stdout: String,
    pub delay: Duration,
}

impl Script {
    pub fn exit(code: i32) -> Self {
        Self {
            behaviour: Behaviour::Exit(code),
            stdout: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn pass() -> Self {
        Self::exit(0)
    }

    pub fn fail() -> Self {
        Self::exit(1)
    }

    pub fn hang() -> Self {
        Self {
            behaviour: Behaviour::Hang,
            ..Self::pass()
        }
    }

    pub fn panic() -> Self {
        Self {
            behaviour: Behaviour::Panic,
            ..Self::pass()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Executor that never spawns processes: each candidate follows a script
/// keyed by its file path (or the default script).
///
/// Records start order and the highest number of candidates in flight at
/// once, so tests can assert on scheduling.
#[derive(Debug, Clone)]
pub struct ScriptedExecutor {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    default: Script,
    started: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new(Script::pass())
    }
}

impl ScriptedExecutor {
    pub fn new(default: Script) -> Self {
        Self {
            scripts: Arc::default(),
            default,
            started: Arc::default(),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }

    pub fn script(self, file_path: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(file_path.to_string(), script);
        self
    }

    /// File paths in the order their executions started.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn script_for(&self, file_path: &str) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .get(file_path)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

impl ExecutorBackend for ScriptedExecutor {
    fn execute(&self, candidate: CandidateTest, timeout: Duration, mut cancel: CancelSignal) -> OutcomeFuture {
        let script = self.script_for(&candidate.file_path);
        let started_log = Arc::clone(&self.started);
        let in_flight = Arc::clone(&self.in_flight);
        let max_in_flight = Arc::clone(&self.max_in_flight);

        Box::pin(async move {
            // Same contract as the process executor: a stop that beat the
            // first poll means the candidate never starts.
            if cancel.is_cancelled() {
                return None;
            }
            started_log.lock().unwrap().push(candidate.file_path.clone());
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _done = InFlight(in_flight);
            let start_time = Utc::now();
            let started = Instant::now();

            let end = match script.behaviour {
                Behaviour::Panic => panic!("scripted executor panic for {}", candidate.file_path),
                Behaviour::Exit(code) => tokio::select! {
                    _ = tokio::time::sleep(script.delay) => ProcessEnd::Exited(Some(code)),
                    _ = tokio::time::sleep(timeout) => ProcessEnd::TimedOut,
                    _ = cancel.cancelled() => ProcessEnd::Cancelled,
                },
                Behaviour::Hang => tokio::select! {
                    _ = tokio::time::sleep(timeout) => ProcessEnd::TimedOut,
                    _ = cancel.cancelled() => ProcessEnd::Cancelled,
                },
            };

            let duration_ms = started.elapsed().as_millis() as u64;
            let mut outcome = ExecutionOutcome::from_end(&candidate, &end, start_time, Utc::now(), duration_ms);
            outcome.stdout = script.stdout;
            Some(outcome)
        })
    }
}

/// Decrements the in-flight counter when the execution ends (or panics).
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
