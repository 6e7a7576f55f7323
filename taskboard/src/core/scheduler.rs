//! Ready/excluded partition over a parsed board.
//!
//! Exclusion checks run in a fixed order: active claim, dependencies, spec.
//! An actively claimed task is reported as `active_worker` even when its
//! dependencies are also unmet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::deps::{deps_ready, unmet_deps};
use crate::core::spec_doc::TaskSpecReport;
use crate::core::types::{
    Claim, ExclusionReason, ExclusionSource, GateState, Task, build_indexes,
};

/// Task a new worker may claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyTask {
    pub task_id: String,
    pub branch: String,
    pub title: String,
    pub deps: String,
    pub status: String,
    pub spec_path: String,
    pub goal_summary: String,
    pub in_scope_summary: String,
    pub acceptance_summary: String,
}

/// Task left out of the ready set, with the reason an operator can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTask {
    pub task_id: String,
    pub branch: String,
    pub title: String,
    pub reason: ExclusionReason,
    pub source: ExclusionSource,
    pub detail: String,
}

impl ExcludedTask {
    fn new(task: &Task, reason: ExclusionReason, detail: String) -> Self {
        Self {
            task_id: task.id.clone(),
            branch: task.branch.clone(),
            title: task.title.clone(),
            reason,
            source: reason.source(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyPartition {
    pub ready_tasks: Vec<ReadyTask>,
    pub excluded_tasks: Vec<ExcludedTask>,
}

/// Partition open tasks into ready and excluded, preserving board order.
///
/// Tasks already `DONE` are finished and appear in neither list. `spec_for`
/// is only consulted for tasks that pass the claim and dependency checks.
pub fn compute_ready<S, C>(
    tasks: &[Task],
    gates: &HashMap<String, GateState>,
    mut spec_for: S,
    mut claim_for: C,
) -> ReadyPartition
where
    S: FnMut(&Task) -> TaskSpecReport,
    C: FnMut(&Task) -> Option<Claim>,
{
    let task_status = build_indexes(tasks);
    let mut partition = ReadyPartition::default();

    for task in tasks.iter().filter(|task| !task.is_done()) {
        if let Some(claim) = claim_for(task) {
            partition.excluded_tasks.push(ExcludedTask::new(
                task,
                ExclusionReason::ActiveWorker,
                format!(
                    "claimed by {} (pid {}, scope {})",
                    claim.owner, claim.pid, claim.scope
                ),
            ));
            continue;
        }

        if !deps_ready(&task.deps, &task_status, gates, &task.branch) {
            let unmet = unmet_deps(&task.deps, &task_status, gates, &task.branch);
            partition.excluded_tasks.push(ExcludedTask::new(
                task,
                ExclusionReason::DepsNotReady,
                format!("waiting on {}", unmet.join(", ")),
            ));
            continue;
        }

        let spec = spec_for(task);
        if !spec.exists {
            partition.excluded_tasks.push(ExcludedTask::new(
                task,
                ExclusionReason::MissingTaskSpec,
                format!("no spec at {}", spec.spec_path),
            ));
            continue;
        }
        if !spec.valid {
            let errors: Vec<String> = spec.errors.iter().map(ToString::to_string).collect();
            partition.excluded_tasks.push(ExcludedTask::new(
                task,
                ExclusionReason::InvalidTaskSpec,
                errors.join("; "),
            ));
            continue;
        }

        partition.ready_tasks.push(ReadyTask {
            task_id: task.id.clone(),
            branch: task.branch.clone(),
            title: task.title.clone(),
            deps: task.deps.clone(),
            status: task.status.clone(),
            spec_path: spec.spec_path,
            goal_summary: spec.goal_summary,
            in_scope_summary: spec.in_scope_summary,
            acceptance_summary: spec.acceptance_summary,
        });
    }

    partition
}
