//! Board parsing: markdown task table plus gate annotations.
//!
//! Boards are hand-edited, so parsing never fails on malformed content.
//! Rows that do not look like tasks and lines without a gate match are
//! skipped.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::core::markdown::{field, parse_row};
use crate::core::types::{Board, GateState, Task};
use crate::error::EngineError;

/// Default gate annotation: `` `G1 (DONE)` ``.
pub const DEFAULT_GATE_REGEX: &str = r"`(G[0-9]+ \([^)]+\))`";

/// Default keywords (compared lowercased) that mark a gate as done.
pub const DEFAULT_DONE_KEYWORDS: [&str; 4] = ["DONE", "완료", "Complete", "complete"];

/// 1-based column numbers for each task field. `branch == 0` disables
/// branch scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub id: usize,
    pub branch: usize,
    pub title: usize,
    pub deps: usize,
    pub status: usize,
}

impl Default for Columns {
    /// Positions for the canonical `| ID | Branch | Title | Deps | Notes | Status |` header.
    fn default() -> Self {
        Self {
            id: 2,
            branch: 3,
            title: 4,
            deps: 5,
            status: 7,
        }
    }
}

/// Immutable parsing rules for one board.
#[derive(Debug, Clone)]
pub struct BoardSchema {
    pub columns: Columns,
    gate_regex: Regex,
    done_keywords: HashSet<String>,
}

impl BoardSchema {
    /// Compile a schema. The gate regex needs at least one capture group.
    pub fn new<I, S>(columns: Columns, gate_regex: &str, done_keywords: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = Regex::new(gate_regex)?;
        if compiled.captures_len() < 2 {
            return Err(EngineError::Config(format!(
                "gate_regex must contain a capture group: {gate_regex}"
            )));
        }
        Ok(Self {
            columns,
            gate_regex: compiled,
            done_keywords: done_keywords
                .into_iter()
                .map(|kw| kw.as_ref().to_lowercase())
                .collect(),
        })
    }

    pub fn gate_regex(&self) -> &Regex {
        &self.gate_regex
    }

    fn gate_state(&self, token: &str) -> GateState {
        if self.done_keywords.contains(&token.trim().to_lowercase()) {
            GateState::Done
        } else {
            GateState::Pending
        }
    }
}

impl Default for BoardSchema {
    fn default() -> Self {
        Self {
            columns: Columns::default(),
            gate_regex: Regex::new(DEFAULT_GATE_REGEX).expect("default gate regex compiles"),
            done_keywords: DEFAULT_DONE_KEYWORDS
                .iter()
                .map(|kw| kw.to_lowercase())
                .collect(),
        }
    }
}

/// Parse board text into tasks (board order) and gates.
pub fn parse_board_text(text: &str, schema: &BoardSchema) -> Board {
    let lines: Vec<&str> = text.lines().collect();
    let cols = resolve_columns(&lines, schema.columns);

    let tasks = lines
        .iter()
        .filter_map(|line| parse_row(line))
        .filter_map(|cells| task_from_cells(&cells, cols))
        .collect();

    Board {
        tasks,
        gates: extract_gates(&lines, schema),
    }
}

/// Override configured columns from the first header row that names both
/// `id` and `status`.
pub fn resolve_columns(lines: &[&str], configured: Columns) -> Columns {
    let mut resolved = configured;

    for cells in lines.iter().filter_map(|line| parse_row(line)) {
        let mut header: HashMap<String, usize> = HashMap::new();
        for col_no in 1..=cells.len() {
            let label = field(&cells, col_no).to_lowercase();
            if !label.is_empty() {
                header.entry(label).or_insert(col_no);
            }
        }

        let (Some(&id), Some(&status)) = (header.get("id"), header.get("status")) else {
            continue;
        };

        if let Some(&title) = header.get("title") {
            resolved.title = title;
        }
        if let Some(&deps) = header.get("deps") {
            resolved.deps = deps;
        }
        resolved.branch = header.get("branch").copied().unwrap_or(0);
        resolved.id = id;
        resolved.status = status;
        break;
    }

    resolved
}

fn task_from_cells(cells: &[String], cols: Columns) -> Option<Task> {
    let id = field(cells, cols.id);
    if id.is_empty() || id == "ID" || id.chars().all(|ch| ch == '-') {
        return None;
    }
    let branch = if cols.branch > 0 {
        field(cells, cols.branch)
    } else {
        ""
    };
    Some(Task {
        id: id.to_string(),
        branch: branch.to_string(),
        title: field(cells, cols.title).to_string(),
        deps: field(cells, cols.deps).to_string(),
        status: field(cells, cols.status).to_string(),
    })
}

fn extract_gates(lines: &[&str], schema: &BoardSchema) -> HashMap<String, GateState> {
    let mut gates = HashMap::new();
    for line in lines {
        let Some(caps) = schema.gate_regex().captures(line) else {
            continue;
        };
        let Some(token) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let gate_id = token.split(' ').next().unwrap_or_default();
        gates.insert(gate_id.to_string(), schema.gate_state(paren_token(token)));
    }
    gates
}

/// Text inside the first `(...)` pair, or `""`.
fn paren_token(token: &str) -> &str {
    let Some(open) = token.find('(') else {
        return "";
    };
    let rest = &token[open + 1..];
    rest.find(')').map_or("", |close| &rest[..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_BOARD: &str = "\
# TODO Board

| ID | Title | Deps | Notes | Status |
|---|---|---|---|---|
| T1-001 | First | - | note | DONE |
| T1-002 | Second | T1-001,G1 | note | TODO |
| T1-003 | Third | G2 | note | TODO |

Gate state: `G1 (DONE)`
Gate state: `G2 (PENDING)`
";

    #[test]
    fn parses_tasks_and_gates_from_legacy_board() {
        let board = parse_board_text(LEGACY_BOARD, &BoardSchema::default());

        let ids: Vec<&str> = board.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1-001", "T1-002", "T1-003"]);
        assert_eq!(board.tasks[1].title, "Second");
        assert_eq!(board.tasks[1].deps, "T1-001,G1");
        assert_eq!(board.tasks[0].status, "DONE");
        assert!(board.tasks.iter().all(|t| t.branch.is_empty()));
        assert_eq!(board.gates["G1"], GateState::Done);
        assert_eq!(board.gates["G2"], GateState::Pending);
    }

    #[test]
    fn header_detection_enables_branch_column() {
        let text = "\
| ID | Branch | Title | Deps | Notes | Status |
|---|---|---|---|---|---|
| 001 | main | First | - | note | DONE |
| 001 | release/1.0 | Second | main:001 | note | TODO |
";
        let schema = BoardSchema::new(
            Columns {
                id: 1,
                branch: 0,
                title: 1,
                deps: 1,
                status: 1,
            },
            DEFAULT_GATE_REGEX,
            DEFAULT_DONE_KEYWORDS,
        )
        .expect("schema");
        let board = parse_board_text(text, &schema);

        assert_eq!(board.tasks.len(), 2);
        assert_eq!(board.tasks[0].branch, "main");
        assert_eq!(board.tasks[1].branch, "release/1.0");
        assert_eq!(board.tasks[1].deps, "main:001");
        assert_eq!(board.tasks[1].status, "TODO");
    }

    #[test]
    fn header_without_branch_disables_branch_scoping() {
        let lines = vec!["| ID | Title | Deps | Status |"];
        let cols = resolve_columns(&lines, Columns::default());
        assert_eq!(
            cols,
            Columns {
                id: 2,
                branch: 0,
                title: 3,
                deps: 4,
                status: 5,
            }
        );
    }

    #[test]
    fn skips_separator_and_repeated_header_rows() {
        let text = "\
| ID | Title | Deps | Notes | Status |
|---|---|---|---|---|
| ID | Title | Deps | Notes | Status |
| | empty id | - | | TODO |
| --- | dashes | - | | TODO |
| T9-001 | Real | - | | TODO |
";
        let board = parse_board_text(text, &BoardSchema::default());
        assert_eq!(board.tasks.len(), 1);
        assert_eq!(board.tasks[0].id, "T9-001");
    }

    #[test]
    fn escaped_pipe_parses_as_single_cell() {
        let text = "\
| ID | Title | Deps | Notes | Status |
|---|---|---|---|---|
| T2-001 | Title with \\| pipe | - | note with \\| pipe | TODO |
";
        let board = parse_board_text(text, &BoardSchema::default());
        assert_eq!(board.tasks.len(), 1);
        assert_eq!(board.tasks[0].title, "Title with | pipe");
        assert_eq!(board.tasks[0].deps, "-");
        assert_eq!(board.tasks[0].status, "TODO");
    }

    #[test]
    fn localized_done_keywords_mark_gates_done() {
        let text = "`G3 (완료)` and later `G4 (Complete)`\n`G5 (blocked)`\n";
        let board = parse_board_text(text, &BoardSchema::default());
        assert_eq!(board.gates["G3"], GateState::Done);
        assert_eq!(board.gates.get("G4"), None, "only the first match per line counts");
        assert_eq!(board.gates["G5"], GateState::Pending);
    }

    #[test]
    fn duplicate_header_label_uses_first_column() {
        let lines = vec!["| ID | Title | Status | Deps | Status |"];
        let cols = resolve_columns(&lines, Columns::default());
        assert_eq!(cols.status, 4);
        assert_eq!(cols.deps, 5);
    }

    #[test]
    fn later_gate_line_overwrites_earlier_state() {
        let text = "`G1 (PENDING)`\n`G2 (DONE)`\n`G1 (DONE)`\n`G2 (blocked)`\n";
        let board = parse_board_text(text, &BoardSchema::default());
        assert_eq!(board.gates["G1"], GateState::Done);
        assert_eq!(board.gates["G2"], GateState::Pending);
        assert_eq!(board.gates.len(), 2);
    }

    #[test]
    fn schema_rejects_regex_without_capture_group() {
        let err = BoardSchema::new(Columns::default(), "G[0-9]+", ["done"]).unwrap_err();
        assert!(err.to_string().contains("capture group"));
    }
}
