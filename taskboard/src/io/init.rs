//! State directory layout and task board bootstrap.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::markdown::parse_row;

/// State directory name under the repository root.
pub const STATE_DIR_NAME: &str = ".codex-tasks";

/// Default spec directory, relative to the repository root.
pub const DEFAULT_SPEC_DIR: &str = ".codex-tasks/planning/specs";

/// Canonical empty board written by bootstrap.
pub const CANONICAL_BOARD: &str = "# TODO Board\n\n| ID | Branch | Title | Deps | Notes | Status |\n|---|---|---|---|---|---|\n";

/// Header layouts of older empty board templates that bootstrap upgrades.
const LEGACY_HEADERS: [&[&str]; 2] = [
    &["Area", "ID", "Title", "Owner", "Deps", "Notes", "Status"],
    &["ID", "Title", "Deps", "Notes", "Status"],
];

/// All canonical paths within the state directory for a repository root.
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub planning_dir: PathBuf,
    pub board_path: PathBuf,
    pub locks_dir: PathBuf,
    pub orchestrator_dir: PathBuf,
    pub config_path: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state_dir = root.join(STATE_DIR_NAME);
        let planning_dir = state_dir.join("planning");
        Self {
            root: root.clone(),
            state_dir: state_dir.clone(),
            planning_dir: planning_dir.clone(),
            board_path: planning_dir.join("TODO.md"),
            locks_dir: state_dir.join("locks"),
            orchestrator_dir: state_dir.join("orchestrator"),
            config_path: state_dir.join("orchestrator.toml"),
        }
    }
}

/// What bootstrap did to the board file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    /// A legacy empty template was replaced by the canonical one.
    Upgraded,
    Unchanged,
}

/// Ensure the board exists, upgrading a legacy empty template in place.
///
/// Boards with data rows are never touched. Running twice is a no-op the
/// second time.
pub fn bootstrap_board(board_path: &Path) -> Result<BootstrapOutcome> {
    if !board_path.exists() {
        write_atomic(board_path, CANONICAL_BOARD)?;
        info!(path = %board_path.display(), "created task board");
        return Ok(BootstrapOutcome::Created);
    }

    let contents = fs::read_to_string(board_path)
        .with_context(|| format!("read board {}", board_path.display()))?;
    if is_legacy_empty_template(&contents) {
        write_atomic(board_path, CANONICAL_BOARD)?;
        info!(path = %board_path.display(), "upgraded legacy board template");
        return Ok(BootstrapOutcome::Upgraded);
    }

    debug!(path = %board_path.display(), "board left as is");
    Ok(BootstrapOutcome::Unchanged)
}

/// True for a board holding only a title, a legacy header, and its separator.
pub fn is_legacy_empty_template(contents: &str) -> bool {
    let mut rows = Vec::new();
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_row(trimmed) {
            Some(cells) => rows.push(cells),
            None => return false,
        }
    }

    let [header, separator] = rows.as_slice() else {
        return false;
    };
    let labels: Vec<&str> = header
        .iter()
        .map(String::as_str)
        .filter(|cell| !cell.is_empty())
        .collect();
    LEGACY_HEADERS.iter().any(|legacy| labels == *legacy) && is_separator_row(separator)
}

fn is_separator_row(cells: &[String]) -> bool {
    let inner: Vec<&String> = cells.iter().filter(|cell| !cell.is_empty()).collect();
    !inner.is_empty()
        && inner
            .iter()
            .all(|cell| cell.chars().all(|ch| ch == '-' || ch == ':'))
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("board path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension(format!("md.{}.tmp", std::process::id()));
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp board {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace board {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_TEMPLATE: &str = "# TODO Board\n\n| Area | ID | Title | Owner | Deps | Notes | Status |\n|---|---|---|---|---|---|---|\n";

    fn read_to_string(path: &Path) -> String {
        fs::read_to_string(path).expect("read file")
    }

    #[test]
    fn paths_hang_off_state_dir() {
        let paths = StatePaths::new("/repo");
        assert_eq!(paths.state_dir, Path::new("/repo/.codex-tasks"));
        assert_eq!(
            paths.board_path,
            Path::new("/repo/.codex-tasks/planning/TODO.md")
        );
        assert_eq!(paths.locks_dir, Path::new("/repo/.codex-tasks/locks"));
        assert_eq!(
            paths.config_path,
            Path::new("/repo/.codex-tasks/orchestrator.toml")
        );
    }

    #[test]
    fn bootstrap_creates_canonical_board() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = StatePaths::new(temp.path());

        let outcome = bootstrap_board(&paths.board_path).expect("bootstrap");
        assert_eq!(outcome, BootstrapOutcome::Created);
        let contents = read_to_string(&paths.board_path);
        assert!(contents.contains("| ID | Branch | Title | Deps | Notes | Status |"));
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = StatePaths::new(temp.path());

        bootstrap_board(&paths.board_path).expect("first");
        let first = read_to_string(&paths.board_path);
        let outcome = bootstrap_board(&paths.board_path).expect("second");
        assert_eq!(outcome, BootstrapOutcome::Unchanged);
        assert_eq!(read_to_string(&paths.board_path), first);
    }

    #[test]
    fn bootstrap_upgrades_legacy_empty_template() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = StatePaths::new(temp.path());
        fs::create_dir_all(&paths.planning_dir).expect("mkdir");
        fs::write(&paths.board_path, LEGACY_TEMPLATE).expect("write legacy");

        let outcome = bootstrap_board(&paths.board_path).expect("bootstrap");
        assert_eq!(outcome, BootstrapOutcome::Upgraded);
        let contents = read_to_string(&paths.board_path);
        assert_eq!(contents, CANONICAL_BOARD);
        assert!(!contents.contains("| Area | ID |"));
    }

    #[test]
    fn bootstrap_never_rewrites_boards_with_rows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = StatePaths::new(temp.path());
        fs::create_dir_all(&paths.planning_dir).expect("mkdir");
        let board = format!("{LEGACY_TEMPLATE}| core | T1-001 | First | me | - | | TODO |\n");
        fs::write(&paths.board_path, &board).expect("write board");

        let outcome = bootstrap_board(&paths.board_path).expect("bootstrap");
        assert_eq!(outcome, BootstrapOutcome::Unchanged);
        assert_eq!(read_to_string(&paths.board_path), board);
    }

    #[test]
    fn legacy_detection_rejects_free_text() {
        let text = format!("{LEGACY_TEMPLATE}\nSome notes about the project.\n");
        assert!(!is_legacy_empty_template(&text));
        assert!(!is_legacy_empty_template(CANONICAL_BOARD));
        assert!(is_legacy_empty_template(
            "| ID | Title | Deps | Notes | Status |\n|:--|---|---|---|--:|\n"
        ));
    }
}
