// src/exec/terminate.rs

//! Graceful-then-forced termination of a test process tree.
//!
//! On Unix every test process is the leader of its own process group (see
//! [`crate::exec::command`]), so signals go to the whole group: browsers and
//! other helpers the test spawned are terminated with it.

use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, warn};

/// Time a process gets to exit after the graceful signal before it is killed.
pub const TERMINATION_GRACE_PERIOD: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateResult {
    /// The process exited within the grace period.
    Exited,
    /// The process had to be force-killed.
    Killed,
}

/// Terminate `child`: graceful signal first, forced kill after `grace`.
///
/// `pid` is the id captured at spawn time (it doubles as the process group
/// id on Unix).
pub async fn terminate_child(child: &mut Child, pid: Option<u32>, grace: Duration) -> TerminateResult {
    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            signal_group(pid, libc::SIGTERM);
            match tokio::time::timeout(grace, child.wait()).await {
                Ok(_) => {
                    // The leader is gone; take out anything it left behind.
                    signal_group(pid, libc::SIGKILL);
                    return TerminateResult::Exited;
                }
                Err(_) => {
                    warn!(
                        pid,
                        grace_ms = grace.as_millis() as u64,
                        "process ignored graceful termination; killing"
                    );
                    signal_group(pid, libc::SIGKILL);
                }
            }
        }
    }

    #[cfg(not(unix))]
    let _ = (pid, grace);

    if let Err(err) = child.start_kill() {
        debug!(error = %err, "start_kill failed; process probably already exited");
    }
    if let Err(err) = child.wait().await {
        warn!(error = %err, "failed to reap killed process");
    }
    TerminateResult::Killed
}

/// Kill whatever is left in the process group of an already-exited test.
pub fn reap_process_group(pid: Option<u32>) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            signal_group(pid, libc::SIGKILL);
        }
    }

    #[cfg(not(unix))]
    let _ = pid;
}

#[cfg(unix)]
fn signal_group(pgid: u32, signal: libc::c_int) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // Negative pid addresses the whole process group. ESRCH (group already
    // gone) is expected and ignored.
    unsafe {
        libc::kill(-pgid, signal);
    }
}
