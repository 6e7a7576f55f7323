//! Lock and worker records under the state directory.
//!
//! Both are `key=value` text files:
//!
//! - `locks/*.lock`: `owner`, `scope`, `task_id`, `worktree`
//! - `orchestrator/*.pid`: `owner`, `scope`, `task_id`, `pid`, `worktree`,
//!   `launch_backend`, `tmux_session`, `log_file`, optional `task_branch`
//!
//! Locks are informational. Only a worker whose pid is alive claims a task;
//! a lock left behind by a crashed worker does not block rescheduling.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::types::{Claim, Task};
use crate::io::process::ProcessProbe;

const LOCK_EXTENSION: &str = "lock";
const WORKER_EXTENSION: &str = "pid";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub owner: String,
    pub scope: String,
    pub task_id: String,
    pub worktree: String,
    pub path: String,
}

impl LockRecord {
    fn from_fields(mut fields: HashMap<String, String>, path: &Path) -> Self {
        let mut take = |key: &str| fields.remove(key).unwrap_or_default();
        Self {
            owner: take("owner"),
            scope: take("scope"),
            task_id: take("task_id"),
            worktree: take("worktree"),
            path: path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub owner: String,
    pub scope: String,
    pub task_id: String,
    /// Branch of the claimed task on branch-scoped boards.
    pub task_branch: String,
    /// `None` when the file has no parseable pid.
    pub pid: Option<i64>,
    pub worktree: String,
    pub launch_backend: String,
    pub tmux_session: String,
    pub log_file: String,
    pub path: String,
}

impl WorkerRecord {
    fn from_fields(mut fields: HashMap<String, String>, path: &Path) -> Self {
        let mut take = |key: &str| fields.remove(key).unwrap_or_default();
        let pid = take("pid").trim().parse::<i64>().ok();
        Self {
            owner: take("owner"),
            scope: take("scope"),
            task_id: take("task_id"),
            task_branch: take("task_branch"),
            pid,
            worktree: take("worktree"),
            launch_backend: take("launch_backend"),
            tmux_session: take("tmux_session"),
            log_file: take("log_file"),
            path: path.display().to_string(),
        }
    }
}

/// Worker record classified by liveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    #[serde(flatten)]
    pub record: WorkerRecord,
    pub active: bool,
}

impl WorkerStatus {
    /// True when this worker holds `task`.
    ///
    /// Unscoped tasks match on id alone. Branch-scoped tasks also need the
    /// worker's `task_branch` to agree; a record without one matches any
    /// branch so an ambiguous claim still excludes.
    pub fn claims(&self, task: &Task) -> bool {
        if !self.active || self.record.task_id.trim() != task.id {
            return false;
        }
        let worker_branch = self.record.task_branch.trim();
        task.branch.is_empty() || worker_branch.is_empty() || worker_branch == task.branch
    }
}

/// Point-in-time view of locks and workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinationSnapshot {
    pub locks: Vec<LockRecord>,
    pub workers: Vec<WorkerStatus>,
}

impl CoordinationSnapshot {
    /// Load all records under `state_dir`, probing each worker pid once.
    pub fn load<P: ProcessProbe>(locks_dir: &Path, workers_dir: &Path, probe: &P) -> Self {
        let locks = read_records(locks_dir, LOCK_EXTENSION)
            .into_iter()
            .map(|(path, fields)| LockRecord::from_fields(fields, &path))
            .collect::<Vec<_>>();

        let workers = read_records(workers_dir, WORKER_EXTENSION)
            .into_iter()
            .map(|(path, fields)| {
                let record = WorkerRecord::from_fields(fields, &path);
                let active = record.pid.is_some_and(|pid| probe.is_alive(pid));
                WorkerStatus { record, active }
            })
            .collect::<Vec<_>>();

        debug!(
            locks = locks.len(),
            workers = workers.len(),
            "coordination snapshot loaded"
        );
        Self { locks, workers }
    }

    /// Claim held on `task` by an active worker, if any.
    pub fn claim_for(&self, task: &Task) -> Option<Claim> {
        self.workers
            .iter()
            .find(|worker| worker.claims(task))
            .map(|worker| Claim {
                owner: worker.record.owner.clone(),
                scope: worker.record.scope.clone(),
                pid: worker.record.pid.unwrap_or_default(),
            })
    }

    pub fn active_count(&self) -> usize {
        self.workers.iter().filter(|worker| worker.active).count()
    }

    pub fn stale_count(&self) -> usize {
        self.workers.len() - self.active_count()
    }
}

/// Parse `key=value` lines. Blank lines, `#` comments, and lines without
/// `=` are ignored; later duplicates win.
pub fn parse_key_values(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Read every `*.{extension}` file in `dir`, sorted by path. Unreadable
/// files are skipped with a warning; a missing dir yields nothing. Non-UTF-8
/// bytes are replaced so the remaining fields still count.
fn read_records(dir: &Path, extension: &str) -> Vec<(PathBuf, HashMap<String, String>)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), err = %err, "cannot list records");
            }
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| match fs::read(&path) {
            Ok(bytes) => {
                let fields = parse_key_values(&String::from_utf8_lossy(&bytes));
                Some((path, fields))
            }
            Err(err) => {
                warn!(path = %path.display(), err = %err, "skipping unreadable record");
                None
            }
        })
        .collect()
}
