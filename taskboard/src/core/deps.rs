//! Dependency expression resolution.
//!
//! A `deps` cell is a comma-separated list of references:
//!
//! | Form          | Example      | Resolves against                 |
//! |---------------|--------------|----------------------------------|
//! | gate          | `G2`         | gate index                       |
//! | legacy task   | `T1-004`     | unscoped key                     |
//! | bare numeric  | `007`        | requesting task's own branch     |
//! | qualified     | `main:007`   | the named branch                 |
//!
//! Anything else is unresolvable and fails closed.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::{DONE, GateState, make_task_key};

static GATE_DEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^G\d+$").expect("valid regex"));
static LEGACY_TASK_DEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T\d+-\d+$").expect("valid regex"));
static NUMERIC_TASK_DEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}$").expect("valid regex"));
static QUALIFIED_TASK_DEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+):(\d{3})$").expect("valid regex"));

/// One classified dependency token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepRef {
    Gate(String),
    /// Task reference with the branch-qualified key to try first.
    Task { token: String, key: String },
    Unresolvable(String),
}

/// Classify a single trimmed token relative to the requesting task's branch.
pub fn classify(token: &str, task_branch: &str) -> DepRef {
    if GATE_DEP.is_match(token) {
        return DepRef::Gate(token.to_string());
    }
    let key = if LEGACY_TASK_DEP.is_match(token) {
        make_task_key(token, "")
    } else if NUMERIC_TASK_DEP.is_match(token) {
        make_task_key(token, task_branch)
    } else if let Some(caps) = QUALIFIED_TASK_DEP.captures(token) {
        make_task_key(&caps[2], &caps[1])
    } else {
        return DepRef::Unresolvable(token.to_string());
    };
    DepRef::Task {
        token: token.to_string(),
        key,
    }
}

/// True when the expression declares no dependencies (`""` or `-`).
pub fn is_empty_expr(deps: &str) -> bool {
    let raw = deps.trim();
    raw.is_empty() || raw == "-"
}

/// Split an expression into classified references, skipping empty tokens.
pub fn parse_deps(deps: &str, task_branch: &str) -> Vec<DepRef> {
    if is_empty_expr(deps) {
        return Vec::new();
    }
    deps.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| classify(token, task_branch))
        .collect()
}

/// Status lookup with the legacy fallback.
///
/// Precedence: the branch-qualified `key` first; if that is not `DONE`, the
/// bare `token` as a plain key. The second step keeps boards written before
/// the branch column existed resolvable.
pub fn lookup_task_status<'a>(
    task_status: &'a HashMap<String, String>,
    key: &str,
    token: &str,
) -> Option<&'a str> {
    match task_status.get(key).map(String::as_str) {
        Some(DONE) => Some(DONE),
        qualified => task_status
            .get(token)
            .map(String::as_str)
            .filter(|status| *status == DONE)
            .or(qualified),
    }
}

/// True when one reference is satisfied.
pub fn dep_satisfied(
    dep: &DepRef,
    task_status: &HashMap<String, String>,
    gate_status: &HashMap<String, GateState>,
) -> bool {
    match dep {
        DepRef::Gate(id) => gate_status.get(id) == Some(&GateState::Done),
        DepRef::Task { token, key } => lookup_task_status(task_status, key, token) == Some(DONE),
        DepRef::Unresolvable(_) => false,
    }
}

/// True when every dependency in `deps` is `DONE`.
pub fn deps_ready(
    deps: &str,
    task_status: &HashMap<String, String>,
    gate_status: &HashMap<String, GateState>,
    task_branch: &str,
) -> bool {
    parse_deps(deps, task_branch)
        .iter()
        .all(|dep| dep_satisfied(dep, task_status, gate_status))
}

/// Tokens of `deps` that are not yet satisfied, for operator-facing detail.
pub fn unmet_deps(
    deps: &str,
    task_status: &HashMap<String, String>,
    gate_status: &HashMap<String, GateState>,
    task_branch: &str,
) -> Vec<String> {
    parse_deps(deps, task_branch)
        .into_iter()
        .filter(|dep| !dep_satisfied(dep, task_status, gate_status))
        .map(|dep| match dep {
            DepRef::Gate(token) | DepRef::Task { token, .. } | DepRef::Unresolvable(token) => {
                token
            }
        })
        .collect()
}
