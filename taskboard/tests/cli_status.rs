//! CLI tests for `taskboard status` and `taskboard init`.

use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use taskboard::exit_codes;
use taskboard::io::init::CANONICAL_BOARD;
use taskboard::test_support::{TestRepo, WorkerFixture};

fn taskboard(repo: &TestRepo, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskboard"))
        .current_dir(repo.root())
        .arg("--repo")
        .arg(repo.root())
        .args(args)
        .output()
        .expect("spawn taskboard")
}

fn assert_ok(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(exit_codes::OK),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn status_json(repo: &TestRepo) -> Value {
    let output = taskboard(repo, &["status"]);
    assert_ok(&output);
    serde_json::from_slice(&output.stdout).expect("status json")
}

#[test]
fn status_bootstraps_missing_board() {
    let repo = TestRepo::new().expect("repo");

    let json = status_json(&repo);

    let board = fs::read_to_string(&repo.paths().board_path).expect("board");
    assert_eq!(board, CANONICAL_BOARD);
    assert_eq!(json["task_board"]["summary"]["total"], 0);
    assert_eq!(json["scheduler"]["summary"]["ready"], 0);
    assert_eq!(json["runtime"]["summary"]["total"], 0);
    assert_eq!(json["coordination"]["summary"]["locks"], 0);
    assert_eq!(
        json["state_dir"],
        repo.paths().state_dir.display().to_string()
    );
}

#[test]
fn status_upgrades_legacy_empty_template_once() {
    let repo = TestRepo::new().expect("repo");
    repo.write_board_text(
        "# TODO Board\n\n| Area | ID | Title | Owner | Deps | Notes | Status |\n|---|---|---|---|---|---|---|\n",
    )
    .expect("board");

    assert_ok(&taskboard(&repo, &["status"]));
    let first = fs::read_to_string(&repo.paths().board_path).expect("board");
    assert_ok(&taskboard(&repo, &["status"]));
    let second = fs::read_to_string(&repo.paths().board_path).expect("board");

    assert_eq!(first, CANONICAL_BOARD);
    assert_eq!(first, second);
}

#[test]
fn status_json_merges_all_sections() {
    let repo = TestRepo::new().expect("repo");
    repo.write_board(&[
        ("T5-001", "Running", "-", "TODO"),
        ("T5-002", "Next", "-", "TODO"),
        ("T5-003", "Done", "-", "DONE"),
    ])
    .expect("board");
    repo.write_specs(&["T5-001", "T5-002"]).expect("specs");
    let live_pid = i64::from(std::process::id());
    let worker = WorkerFixture {
        tmux_session: "codex-t5",
        log_file: "/tmp/codex-t5.log",
        ..WorkerFixture::new("AgentA", "api", "T5-001", live_pid)
    };
    repo.write_worker("agent-a.pid", &worker).expect("worker");
    repo.write_lock("api.lock", "AgentA", "api", "T5-001")
        .expect("lock");

    let json = status_json(&repo);

    assert_eq!(json["scheduler"]["summary"]["ready"], 1);
    assert_eq!(json["scheduler"]["summary"]["excluded"], 1);
    assert_eq!(json["runtime"]["summary"]["total"], 1);
    assert_eq!(json["runtime"]["summary"]["active"], 1);
    assert_eq!(json["runtime"]["summary"]["stale"], 0);
    assert_eq!(json["coordination"]["summary"]["locks"], 1);
    assert_eq!(json["task_board"]["summary"]["total"], 3);

    let worker = &json["runtime"]["workers"][0];
    assert_eq!(worker["owner"], "AgentA");
    assert_eq!(worker["pid"], live_pid);
    assert_eq!(worker["launch_backend"], "tmux");
    assert_eq!(worker["tmux_session"], "codex-t5");
    assert_eq!(worker["log_file"], "/tmp/codex-t5.log");
    assert_eq!(worker["active"], true);
}

#[test]
fn status_tui_prints_summary_lines() {
    let repo = TestRepo::new().expect("repo");
    repo.write_board(&[("T6-001", "Free", "-", "TODO")])
        .expect("board");
    repo.write_specs(&["T6-001"]).expect("specs");

    let output = taskboard(&repo, &["status", "--format", "tui"]);
    assert_ok(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    // Piped stdout is not a terminal, so no ANSI emphasis.
    assert_eq!(lines[0], "Scheduler: ready=1 excluded=0");
    assert_eq!(lines[1], "Runtime: total=0 active=0 stale=0");
    assert_eq!(lines[2], "Coordination: locks=0");
    assert!(stdout.contains("T6-001 Free"));
}

#[test]
fn init_creates_board_and_prints_path() {
    let repo = TestRepo::new().expect("repo");

    let output = taskboard(&repo, &["init"]);
    assert_ok(&output);

    let printed = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        printed.trim(),
        repo.paths().board_path.display().to_string()
    );
    let board = fs::read_to_string(&repo.paths().board_path).expect("board");
    assert_eq!(board, CANONICAL_BOARD);
}

#[test]
fn init_never_rewrites_board_with_rows() {
    let repo = TestRepo::new().expect("repo");
    repo.write_board(&[("T7-001", "Keep me", "-", "TODO")])
        .expect("board");
    let before = fs::read_to_string(&repo.paths().board_path).expect("board");

    assert_ok(&taskboard(&repo, &["init"]));

    let after = fs::read_to_string(&repo.paths().board_path).expect("board");
    assert_eq!(before, after);
}
