//! Process liveness probing for recorded worker pids.
//!
//! The probe only observes whether a pid exists; the engine never needs to
//! own the process. Results are point-in-time.

use tracing::{debug, instrument};

/// Capability to check whether a pid refers to a live process.
pub trait ProcessProbe {
    fn is_alive(&self, pid: i64) -> bool;
}

/// Probe backed by the host operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    #[instrument(skip(self))]
    fn is_alive(&self, pid: i64) -> bool {
        // 0 and negatives address process groups, never a single worker.
        if pid <= 0 {
            return false;
        }
        let alive = probe_pid(pid);
        debug!(pid, alive, "probed pid");
        alive
    }
}

#[cfg(target_os = "linux")]
fn probe_pid(pid: i64) -> bool {
    std::path::Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn probe_pid(pid: i64) -> bool {
    use std::process::{Command, Stdio};
    use tracing::warn;

    let status = Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(status) => status.success(),
        Err(err) => {
            warn!(pid, err = %err, "failed to run kill -0");
            false
        }
    }
}

#[cfg(windows)]
fn probe_pid(pid: i64) -> bool {
    use std::process::{Command, Stdio};
    use tracing::warn;

    let output = Command::new("tasklist")
        .args(["/FI", &format!("PID eq {pid}"), "/NH", "/FO", "CSV"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&format!("\"{pid}\"")),
        Err(err) => {
            warn!(pid, err = %err, "failed to run tasklist");
            false
        }
    }
}

#[cfg(not(any(unix, windows)))]
fn probe_pid(pid: i64) -> bool {
    tracing::warn!(pid, "no process probe on this platform, treating pid as stale");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_alive() {
        let pid = i64::from(std::process::id());
        assert!(SystemProbe.is_alive(pid));
    }

    #[test]
    fn non_positive_pids_are_never_alive() {
        assert!(!SystemProbe.is_alive(0));
        assert!(!SystemProbe.is_alive(-1));
    }

    #[test]
    fn unused_pid_is_stale() {
        assert!(!SystemProbe.is_alive(99_999_999));
    }
}
