//! Engine configuration stored under `.codex-tasks/orchestrator.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::board::{BoardSchema, Columns, DEFAULT_DONE_KEYWORDS, DEFAULT_GATE_REGEX};
use crate::error::{EngineError, Result};
use crate::io::init::DEFAULT_SPEC_DIR;

/// Engine configuration (TOML).
///
/// Every field is optional; a missing file or section falls back to the
/// canonical layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub repo: RepoConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoConfig {
    /// Spec directory. Relative paths resolve against the repository root.
    pub spec_dir: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            spec_dir: DEFAULT_SPEC_DIR.to_string(),
        }
    }
}

/// Board column schema and gate rules. Columns are 1-based; header
/// auto-detection overrides them when the board names its columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardConfig {
    pub id_col: usize,
    /// `0` disables branch scoping.
    pub branch_col: usize,
    pub title_col: usize,
    pub deps_col: usize,
    pub status_col: usize,
    pub gate_regex: String,
    pub done_keywords: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let cols = Columns::default();
        Self {
            id_col: cols.id,
            branch_col: cols.branch,
            title_col: cols.title,
            deps_col: cols.deps,
            status_col: cols.status,
            gate_regex: DEFAULT_GATE_REGEX.to_string(),
            done_keywords: DEFAULT_DONE_KEYWORDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl BoardConfig {
    /// Compile into the immutable schema used by the board reader.
    pub fn schema(&self) -> Result<BoardSchema> {
        let columns = Columns {
            id: self.id_col,
            branch: self.branch_col,
            title: self.title_col,
            deps: self.deps_col,
            status: self.status_col,
        };
        BoardSchema::new(columns, &self.gate_regex, &self.done_keywords)
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let board = &self.board;
        for (name, value) in [
            ("id_col", board.id_col),
            ("title_col", board.title_col),
            ("deps_col", board.deps_col),
            ("status_col", board.status_col),
        ] {
            if value == 0 {
                return Err(EngineError::Config(format!("board.{name} must be >= 1")));
            }
        }
        if self.repo.spec_dir.trim().is_empty() {
            return Err(EngineError::Config(
                "repo.spec_dir must not be empty".to_string(),
            ));
        }
        board.schema()?;
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(EngineConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| EngineError::io(path, err))?;
    let cfg: EngineConfig = toml::from_str(&contents)?;
    cfg.validate()?;
    debug!(path = %path.display(), spec_dir = %cfg.repo.spec_dir, "config loaded");
    Ok(cfg)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = || std::env::var_os("HOME").map(PathBuf::from);
    if raw == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = home()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
