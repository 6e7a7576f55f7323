//! Shared deterministic types for the readiness engine.
//!
//! These types define stable contracts between core components. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Status label that marks a task (or gate) as finished.
pub const DONE: &str = "DONE";

/// One row of the task board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Empty when the board has no branch column (unscoped/"main" board).
    pub branch: String,
    pub title: String,
    /// Raw, comma-separated dependency expression.
    pub deps: String,
    pub status: String,
}

impl Task {
    /// Canonical key for this task (`branch::id` or `id`).
    pub fn key(&self) -> String {
        make_task_key(&self.id, &self.branch)
    }

    pub fn is_done(&self) -> bool {
        self.status == DONE
    }
}

/// Gate state derived from the parenthesized token on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateState {
    Done,
    Pending,
}

/// Parsed board contents: tasks in board order plus board-global gates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub tasks: Vec<Task>,
    pub gates: HashMap<String, GateState>,
}

/// Build the canonical task key.
///
/// Returns `branch::id` when the branch is non-empty, else the bare id.
pub fn make_task_key(task_id: &str, task_branch: &str) -> String {
    let id = task_id.trim();
    let branch = task_branch.trim();
    if branch.is_empty() {
        id.to_string()
    } else {
        format!("{branch}::{id}")
    }
}

/// Index task statuses by canonical key. Later rows win on key collisions.
pub fn build_indexes(tasks: &[Task]) -> HashMap<String, String> {
    tasks
        .iter()
        .map(|task| (task.key(), task.status.clone()))
        .collect()
}

/// An active worker's claim on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub owner: String,
    pub scope: String,
    pub pid: i64,
}

/// Why a task was left out of the ready set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    ActiveWorker,
    DepsNotReady,
    MissingTaskSpec,
    InvalidTaskSpec,
}

impl ExclusionReason {
    /// Component that produced the exclusion.
    pub fn source(self) -> ExclusionSource {
        match self {
            ExclusionReason::ActiveWorker => ExclusionSource::Pid,
            ExclusionReason::DepsNotReady
            | ExclusionReason::MissingTaskSpec
            | ExclusionReason::InvalidTaskSpec => ExclusionSource::Scheduler,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExclusionReason::ActiveWorker => "active_worker",
            ExclusionReason::DepsNotReady => "deps_not_ready",
            ExclusionReason::MissingTaskSpec => "missing_task_spec",
            ExclusionReason::InvalidTaskSpec => "invalid_task_spec",
        }
    }
}

/// Where an exclusion decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionSource {
    /// Observed process liveness.
    Pid,
    Scheduler,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::task;

    #[test]
    fn task_key_includes_branch_when_present() {
        assert_eq!(make_task_key("001", "release/1.0"), "release/1.0::001");
        assert_eq!(make_task_key(" T1-001 ", "  "), "T1-001");
    }

    #[test]
    fn built_index_finds_every_task_by_its_key() {
        let tasks = vec![
            task("001", "main", "-", "DONE"),
            task("001", "release/1.0", "main:001", "TODO"),
            task("T1-002", "", "-", "TODO"),
        ];
        let index = build_indexes(&tasks);
        for t in &tasks {
            let key = make_task_key(&t.id, &t.branch);
            assert_eq!(index.get(&key), Some(&t.status));
        }
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn duplicate_keys_collapse_to_last_row() {
        let tasks = vec![task("001", "main", "-", "TODO"), task("001", "main", "-", "DONE")];
        let index = build_indexes(&tasks);
        assert_eq!(index.len(), 1);
        assert_eq!(index["main::001"], "DONE");
    }

    #[test]
    fn reasons_map_to_sources() {
        assert_eq!(ExclusionReason::ActiveWorker.source(), ExclusionSource::Pid);
        assert_eq!(
            ExclusionReason::InvalidTaskSpec.source(),
            ExclusionSource::Scheduler
        );
        let json = serde_json::to_string(&ExclusionReason::MissingTaskSpec).expect("json");
        assert_eq!(json, "\"missing_task_spec\"");
    }
}
