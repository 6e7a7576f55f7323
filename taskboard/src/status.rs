//! Unified status view for `taskboard status`.
//!
//! Bootstraps the board, then reads the board, coordination records, and
//! specs once and folds them into a single snapshot. The same snapshot backs
//! both the JSON and the terminal rendering.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument};

use crate::core::scheduler::{ExcludedTask, ReadyTask};
use crate::engine::EngineContext;
use crate::io::coordination::{LockRecord, WorkerStatus};
use crate::io::init::bootstrap_board;
use crate::io::process::ProcessProbe;
use crate::ready::partition_board;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub state_dir: String,
    pub scheduler: SchedulerSection,
    pub runtime: RuntimeSection,
    pub coordination: CoordinationSection,
    pub task_board: TaskBoardSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerSection {
    pub summary: SchedulerSummary,
    pub ready_tasks: Vec<ReadyTask>,
    pub excluded_tasks: Vec<ExcludedTask>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerSummary {
    pub ready: usize,
    pub excluded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeSection {
    pub summary: RuntimeSummary,
    pub workers: Vec<WorkerStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuntimeSummary {
    pub total: usize,
    pub active: usize,
    pub stale: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinationSection {
    pub summary: CoordinationSummary,
    pub locks: Vec<LockRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoordinationSummary {
    pub locks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskBoardSection {
    pub path: String,
    pub summary: TaskBoardSummary,
    pub tasks: Vec<BoardTask>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskBoardSummary {
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardTask {
    pub task_id: String,
    pub branch: String,
    pub title: String,
    pub deps: String,
    pub status: String,
}

/// Output format for `taskboard status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatusFormat {
    #[default]
    Json,
    Tui,
}

/// Bootstrap the board and collect the unified snapshot.
#[instrument(skip_all)]
pub fn collect_status<P: ProcessProbe>(ctx: &EngineContext, probe: &P) -> Result<StatusSnapshot> {
    let outcome = bootstrap_board(&ctx.paths.board_path).context("bootstrap task board")?;
    info!(?outcome, "board bootstrap");

    let board = ctx.load_board()?;
    let coordination = ctx.coordination(probe);
    let partition = partition_board(ctx, &board, &coordination);

    let tasks = board
        .tasks
        .iter()
        .map(|task| BoardTask {
            task_id: task.id.clone(),
            branch: task.branch.clone(),
            title: task.title.clone(),
            deps: task.deps.clone(),
            status: task.status.clone(),
        })
        .collect::<Vec<_>>();

    Ok(StatusSnapshot {
        state_dir: ctx.paths.state_dir.display().to_string(),
        scheduler: SchedulerSection {
            summary: SchedulerSummary {
                ready: partition.ready_tasks.len(),
                excluded: partition.excluded_tasks.len(),
            },
            ready_tasks: partition.ready_tasks,
            excluded_tasks: partition.excluded_tasks,
        },
        runtime: RuntimeSection {
            summary: RuntimeSummary {
                total: coordination.workers.len(),
                active: coordination.active_count(),
                stale: coordination.stale_count(),
            },
            workers: coordination.workers,
        },
        coordination: CoordinationSection {
            summary: CoordinationSummary {
                locks: coordination.locks.len(),
            },
            locks: coordination.locks,
        },
        task_board: TaskBoardSection {
            path: ctx.paths.board_path.display().to_string(),
            summary: TaskBoardSummary { total: tasks.len() },
            tasks,
        },
    })
}

/// Load context for `root` and collect the snapshot.
pub fn status_from_root<P: ProcessProbe>(
    root: &Path,
    config_path: Option<&Path>,
    probe: &P,
) -> Result<StatusSnapshot> {
    let ctx = EngineContext::load(root, config_path)?;
    collect_status(&ctx, probe)
}

/// Render the snapshot as terminal lines. `emphasis` wraps section labels
/// in ANSI bold.
pub fn render_tui(snapshot: &StatusSnapshot, emphasis: bool) -> String {
    let label = |text: &str| {
        if emphasis {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    };

    let scheduler = snapshot.scheduler.summary;
    let runtime = snapshot.runtime.summary;
    let mut lines = vec![
        format!(
            "{} ready={} excluded={}",
            label("Scheduler:"),
            scheduler.ready,
            scheduler.excluded
        ),
        format!(
            "{} total={} active={} stale={}",
            label("Runtime:"),
            runtime.total,
            runtime.active,
            runtime.stale
        ),
        format!(
            "{} locks={}",
            label("Coordination:"),
            snapshot.coordination.summary.locks
        ),
    ];

    let ready = &snapshot.scheduler.ready_tasks;
    let excluded = &snapshot.scheduler.excluded_tasks;
    if !ready.is_empty() || !excluded.is_empty() {
        lines.push(label("Tasks:"));
    }
    lines.extend(ready.iter().map(|task| {
        format!(
            "  ready    {} {}",
            display_id(&task.task_id, &task.branch),
            task.title
        )
    }));
    lines.extend(excluded.iter().map(|task| {
        format!(
            "  excluded {} {} [{}] {}",
            display_id(&task.task_id, &task.branch),
            task.title,
            task.reason.label(),
            task.detail
        )
    }));

    if !snapshot.runtime.workers.is_empty() {
        lines.push(label("Workers:"));
    }
    lines.extend(snapshot.runtime.workers.iter().map(|worker| {
        let record = &worker.record;
        let pid = record
            .pid
            .map_or_else(|| "-".to_string(), |pid| pid.to_string());
        format!(
            "  {} {} task={} pid={} backend={} session={} log={}",
            if worker.active { "active" } else { "stale " },
            record.owner,
            record.task_id,
            pid,
            record.launch_backend,
            record.tmux_session,
            record.log_file
        )
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn display_id(task_id: &str, branch: &str) -> String {
    if branch.is_empty() {
        task_id.to_string()
    } else {
        format!("{branch}:{task_id}")
    }
}
