//! Per-invocation engine context: resolved paths, config, and board schema.
//!
//! Nothing is cached between invocations. Every command builds a fresh
//! context and reads the board, specs, and records from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::board::BoardSchema;
use crate::core::spec_doc::TaskSpecReport;
use crate::core::types::{Board, Task};
use crate::io::board_store::parse_board;
use crate::io::config::{EngineConfig, load_config};
use crate::io::coordination::CoordinationSnapshot;
use crate::io::init::StatePaths;
use crate::io::process::ProcessProbe;
use crate::io::spec_store::evaluate_task_spec;

#[derive(Debug, Clone)]
pub struct EngineContext {
    pub paths: StatePaths,
    pub config: EngineConfig,
    pub schema: BoardSchema,
}

impl EngineContext {
    /// Resolve paths under `root` and load config from `config_path`, or the
    /// default `orchestrator.toml` in the state dir.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let paths = StatePaths::new(root);
        let config_path: PathBuf =
            config_path.map_or_else(|| paths.config_path.clone(), Path::to_path_buf);
        let config = load_config(&config_path)
            .with_context(|| format!("load config {}", config_path.display()))?;
        let schema = config.board.schema().context("compile board schema")?;
        debug!(spec_dir = %config.repo.spec_dir, "engine context ready");
        Ok(Self {
            paths,
            config,
            schema,
        })
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn load_board(&self) -> Result<Board> {
        parse_board(&self.paths.board_path, &self.schema)
            .context("load task board")
    }

    pub fn spec_for(&self, task: &Task) -> TaskSpecReport {
        evaluate_task_spec(self.root(), &task.id, &task.branch, &self.config.repo.spec_dir)
    }

    pub fn coordination<P: ProcessProbe>(&self, probe: &P) -> CoordinationSnapshot {
        CoordinationSnapshot::load(&self.paths.locks_dir, &self.paths.orchestrator_dir, probe)
    }
}
