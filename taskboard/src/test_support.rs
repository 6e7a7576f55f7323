//! Test-only helpers for constructing boards, specs, and worker records.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::spec_doc::TaskSpecReport;
use crate::core::types::Task;
use crate::io::init::{DEFAULT_SPEC_DIR, StatePaths};
use crate::io::process::ProcessProbe;

/// Create a task row with a deterministic title.
pub fn task(id: &str, branch: &str, deps: &str, status: &str) -> Task {
    Task {
        id: id.to_string(),
        branch: branch.to_string(),
        title: format!("{id} title"),
        deps: deps.to_string(),
        status: status.to_string(),
    }
}

fn fake_spec_path(task: &Task) -> String {
    if task.branch.is_empty() {
        format!("/specs/{}.md", task.id)
    } else {
        format!("/specs/{}/{}.md", task.branch, task.id)
    }
}

/// Spec report for a task whose spec is present and valid.
pub fn valid_spec(task: &Task) -> TaskSpecReport {
    TaskSpecReport {
        task_id: task.id.clone(),
        task_branch: task.branch.clone(),
        spec_rel_path: fake_spec_path(task),
        spec_path: fake_spec_path(task),
        exists: true,
        valid: true,
        errors: Vec::new(),
        goal_summary: format!("Deliver {}.", task.id),
        in_scope_summary: "implement task behavior".to_string(),
        acceptance_summary: "criteria one; criteria two".to_string(),
    }
}

/// Spec report for a task with no spec file.
pub fn missing_spec(task: &Task) -> TaskSpecReport {
    TaskSpecReport {
        exists: false,
        valid: false,
        goal_summary: String::new(),
        in_scope_summary: String::new(),
        acceptance_summary: String::new(),
        ..valid_spec(task)
    }
}

/// Well-formed spec document for `task_id`.
pub fn spec_text(task_id: &str) -> String {
    format!(
        "# Task Spec: {task_id}\n\n## Goal\nDeliver {task_id}.\n\n## In Scope\n- implement task behavior\n\n## Acceptance Criteria\n- criteria one\n- criteria two\n"
    )
}

/// Probe that reports a fixed set of pids as alive.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    alive: HashSet<i64>,
}

impl FakeProbe {
    pub fn alive(pids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            alive: pids.into_iter().collect(),
        }
    }
}

impl ProcessProbe for FakeProbe {
    fn is_alive(&self, pid: i64) -> bool {
        self.alive.contains(&pid)
    }
}

/// Worker record fields for [`TestRepo::write_worker`].
#[derive(Debug, Clone)]
pub struct WorkerFixture<'a> {
    pub owner: &'a str,
    pub scope: &'a str,
    pub task_id: &'a str,
    pub pid: i64,
    pub launch_backend: &'a str,
    pub tmux_session: &'a str,
    pub log_file: &'a str,
}

impl<'a> WorkerFixture<'a> {
    pub fn new(owner: &'a str, scope: &'a str, task_id: &'a str, pid: i64) -> Self {
        Self {
            owner,
            scope,
            task_id,
            pid,
            launch_backend: "tmux",
            tmux_session: "tmux-session",
            log_file: "/tmp/codex-tasks.log",
        }
    }
}

/// Temporary repository root with a state directory layout.
pub struct TestRepo {
    temp: TempDir,
    paths: StatePaths,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let root = temp.path().join("repo");
        fs::create_dir_all(&root).context("create repo root")?;
        let paths = StatePaths::new(root);
        Ok(Self { temp, paths })
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    /// Scratch space outside the repository root.
    pub fn outside(&self) -> PathBuf {
        self.temp.path().join("outside")
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    pub fn write_board_text(&self, text: &str) -> Result<()> {
        write_file(&self.paths.board_path, text)
    }

    /// Board with the legacy unscoped header; rows are `(id, title, deps, status)`.
    pub fn write_board(&self, rows: &[(&str, &str, &str, &str)]) -> Result<()> {
        let mut text = String::from(
            "# TODO Board\n\n| ID | Title | Deps | Notes | Status |\n|---|---|---|---|---|\n",
        );
        for (id, title, deps, status) in rows {
            text.push_str(&format!("| {id} | {title} | {deps} |  | {status} |\n"));
        }
        self.write_board_text(&text)
    }

    /// Board with a branch column; rows are `(id, branch, title, deps, status)`.
    pub fn write_branch_board(&self, rows: &[(&str, &str, &str, &str, &str)]) -> Result<()> {
        let mut text = String::from(
            "# TODO Board\n\n| ID | Branch | Title | Deps | Notes | Status |\n|---|---|---|---|---|---|\n",
        );
        for (id, branch, title, deps, status) in rows {
            text.push_str(&format!(
                "| {id} | {branch} | {title} | {deps} |  | {status} |\n"
            ));
        }
        self.write_board_text(&text)
    }

    pub fn spec_path(&self, task_id: &str, branch: &str) -> PathBuf {
        let base = self.root().join(DEFAULT_SPEC_DIR);
        if branch.is_empty() {
            base.join(format!("{task_id}.md"))
        } else {
            base.join(branch).join(format!("{task_id}.md"))
        }
    }

    pub fn write_spec(&self, task_id: &str, branch: &str, text: &str) -> Result<PathBuf> {
        let path = self.spec_path(task_id, branch);
        write_file(&path, text)?;
        Ok(path)
    }

    /// Write a valid spec for each unscoped task id.
    pub fn write_specs(&self, task_ids: &[&str]) -> Result<()> {
        for task_id in task_ids {
            self.write_spec(task_id, "", &spec_text(task_id))?;
        }
        Ok(())
    }

    pub fn write_lock(&self, file_name: &str, owner: &str, scope: &str, task_id: &str) -> Result<()> {
        let body = format!(
            "owner={owner}\nscope={scope}\ntask_id={task_id}\nworktree={}\n",
            self.root().display()
        );
        write_file(&self.paths.locks_dir.join(file_name), &body)
    }

    pub fn write_worker(&self, file_name: &str, worker: &WorkerFixture<'_>) -> Result<()> {
        let body = format!(
            "owner={}\nscope={}\ntask_id={}\npid={}\nworktree={}\nlaunch_backend={}\ntmux_session={}\nlog_file={}\n",
            worker.owner,
            worker.scope,
            worker.task_id,
            worker.pid,
            self.root().display(),
            worker.launch_backend,
            worker.tmux_session,
            worker.log_file,
        );
        write_file(&self.paths.orchestrator_dir.join(file_name), &body)
    }

    pub fn write_config(&self, text: &str) -> Result<()> {
        write_file(&self.paths.config_path, text)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write file {}", path.display()))
}
