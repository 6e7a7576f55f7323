//! Task spec resolution and loading.
//!
//! Specs live at `{spec_dir}/{branch/}{task_id}.md`. A relative `spec_dir`
//! resolves against the repository root; an absolute one is used verbatim.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::core::spec_doc::{SpecIssue, TaskSpecReport, check_spec_text};
use crate::io::config::expand_home;

/// Spec path as derived from `spec_dir`: forward-slash relative, or absolute.
pub fn task_spec_rel_path(task_id: &str, task_branch: &str, spec_dir: &str) -> String {
    let target = spec_target(task_id, task_branch, spec_dir);
    if target.is_absolute() {
        return target.display().to_string();
    }
    to_posix(&target)
}

/// Absolute spec path for a task under `repo_root`.
pub fn task_spec_abs_path(
    repo_root: &Path,
    task_id: &str,
    task_branch: &str,
    spec_dir: &str,
) -> PathBuf {
    let target = spec_target(task_id, task_branch, spec_dir);
    if target.is_absolute() {
        target
    } else {
        repo_root.join(target)
    }
}

fn spec_target(task_id: &str, task_branch: &str, spec_dir: &str) -> PathBuf {
    let base = expand_home(spec_dir);
    let branch = task_branch.trim();
    let file_name = format!("{task_id}.md");
    if branch.is_empty() {
        base.join(file_name)
    } else {
        base.join(branch).join(file_name)
    }
}

fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve, read, and validate the spec for one task.
///
/// Never fails: a missing file yields `exists=false`, an unreadable one
/// `exists=true` with a `read_error` issue.
pub fn evaluate_task_spec(
    repo_root: &Path,
    task_id: &str,
    task_branch: &str,
    spec_dir: &str,
) -> TaskSpecReport {
    let spec_path = task_spec_abs_path(repo_root, task_id, task_branch, spec_dir);
    let mut report = TaskSpecReport {
        task_id: task_id.to_string(),
        task_branch: task_branch.to_string(),
        spec_rel_path: task_spec_rel_path(task_id, task_branch, spec_dir),
        spec_path: spec_path.display().to_string(),
        ..TaskSpecReport::default()
    };

    if !spec_path.exists() {
        debug!(task_id, path = %spec_path.display(), "spec missing");
        return report;
    }
    report.exists = true;

    let text = match fs::read_to_string(&spec_path) {
        Ok(text) => text,
        Err(err) => {
            warn!(task_id, path = %spec_path.display(), err = %err, "spec unreadable");
            report.errors.push(SpecIssue::ReadError {
                message: err.to_string(),
            });
            return report;
        }
    };

    let check = check_spec_text(&text);
    report.valid = check.is_valid();
    report.errors = check.errors;
    report.goal_summary = check.goal_summary;
    report.in_scope_summary = check.in_scope_summary;
    report.acceptance_summary = check.acceptance_summary;
    debug!(task_id, valid = report.valid, "spec evaluated");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::init::DEFAULT_SPEC_DIR;

    const VALID_SPEC: &str = "\
# Task Spec: T2-001

## Goal
Ship API endpoint for widgets.

## In Scope
- endpoint implementation

## Acceptance Criteria
- [ ] endpoint handles auth
";

    #[test]
    fn rel_path_includes_branch_directory() {
        assert_eq!(
            task_spec_rel_path("T1-001", "", DEFAULT_SPEC_DIR),
            ".codex-tasks/planning/specs/T1-001.md"
        );
        assert_eq!(
            task_spec_rel_path("002", "release/1.0", "./specs"),
            "specs/release/1.0/002.md"
        );
        assert_eq!(
            task_spec_rel_path("002", "", "/srv/specs"),
            "/srv/specs/002.md"
        );
    }

    #[test]
    fn absolute_spec_dir_ignores_repo_root() {
        let path = task_spec_abs_path(Path::new("/repo"), "T7-001", "", "/elsewhere/specs");
        assert_eq!(path, PathBuf::from("/elsewhere/specs/T7-001.md"));
        let path = task_spec_abs_path(Path::new("/repo"), "T7-001", "dev", "specs");
        assert_eq!(path, PathBuf::from("/repo/specs/dev/T7-001.md"));
    }

    #[test]
    fn missing_spec_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let report = evaluate_task_spec(temp.path(), "T1-001", "", DEFAULT_SPEC_DIR);
        assert!(!report.exists);
        assert!(!report.valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.spec_rel_path, ".codex-tasks/planning/specs/T1-001.md");
    }

    #[test]
    fn valid_spec_on_disk() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = task_spec_abs_path(temp.path(), "T2-001", "", DEFAULT_SPEC_DIR);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, VALID_SPEC).expect("write");

        let report = evaluate_task_spec(temp.path(), "T2-001", "", DEFAULT_SPEC_DIR);
        assert!(report.exists);
        assert!(report.valid);
        assert_eq!(report.spec_path, path.display().to_string());
        assert_eq!(report.goal_summary, "Ship API endpoint for widgets.");
        assert_eq!(report.acceptance_summary, "endpoint handles auth");
    }

    #[test]
    fn unreadable_spec_exists_but_is_invalid() {
        let temp = tempfile::tempdir().expect("tempdir");
        // A directory where the file should be cannot be read as text.
        let path = task_spec_abs_path(temp.path(), "T3-001", "", DEFAULT_SPEC_DIR);
        fs::create_dir_all(&path).expect("mkdir");

        let report = evaluate_task_spec(temp.path(), "T3-001", "", DEFAULT_SPEC_DIR);
        assert!(report.exists);
        assert!(!report.valid);
        assert!(matches!(report.errors[..], [SpecIssue::ReadError { .. }]));
    }
}
