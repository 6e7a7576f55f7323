//! Structural validation of task spec documents.
//!
//! A spec must carry non-empty `Goal`, `In Scope`, and `Acceptance Criteria`
//! sections (markdown heading levels 2-6). Content under any other heading is
//! ignored and closes the current required section.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const GOAL: &str = "Goal";
pub const IN_SCOPE: &str = "In Scope";
pub const ACCEPTANCE_CRITERIA: &str = "Acceptance Criteria";

/// Required sections in canonical report order.
pub const REQUIRED_SECTIONS: [&str; 3] = [GOAL, IN_SCOPE, ACCEPTANCE_CRITERIA];

const ACCEPTANCE_SUMMARY_ITEMS: usize = 3;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{2,6}\s+(.+?)\s*$").expect("valid regex"));
static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+\[[ xX]\]\s*(.+)$").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+]\s+|\d+\.\s+)(.+)$").expect("valid regex"));

/// One structural problem with a spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecIssue {
    MissingSections { sections: Vec<String> },
    EmptySections { sections: Vec<String> },
    ReadError { message: String },
}

impl fmt::Display for SpecIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecIssue::MissingSections { sections } => {
                write!(f, "missing_sections: {}", sections.join(", "))
            }
            SpecIssue::EmptySections { sections } => {
                write!(f, "empty_sections: {}", sections.join(", "))
            }
            SpecIssue::ReadError { message } => write!(f, "spec_read_error: {message}"),
        }
    }
}

/// Resolved and evaluated spec for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpecReport {
    pub task_id: String,
    pub task_branch: String,
    /// Path as derived from the spec dir (repo-relative unless absolute).
    pub spec_rel_path: String,
    pub spec_path: String,
    pub exists: bool,
    pub valid: bool,
    pub errors: Vec<SpecIssue>,
    pub goal_summary: String,
    pub in_scope_summary: String,
    pub acceptance_summary: String,
}

/// Outcome of checking spec text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCheck {
    pub errors: Vec<SpecIssue>,
    pub goal_summary: String,
    pub in_scope_summary: String,
    pub acceptance_summary: String,
}

impl SpecCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate spec text and, when valid, derive one-line summaries.
pub fn check_spec_text(text: &str) -> SpecCheck {
    let (sections, present) = extract_sections(text);
    let body = |name: &str| sections.get(name).map_or("", String::as_str);

    let mut missing = Vec::new();
    let mut empty = Vec::new();
    for name in REQUIRED_SECTIONS {
        if !present.contains(name) {
            missing.push(name.to_string());
        } else if first_nonempty_line(body(name)).is_empty() {
            empty.push(name.to_string());
        }
    }

    let mut check = SpecCheck::default();
    if !missing.is_empty() {
        check
            .errors
            .push(SpecIssue::MissingSections { sections: missing });
    }
    if !empty.is_empty() {
        check.errors.push(SpecIssue::EmptySections { sections: empty });
    }
    if !check.is_valid() {
        return check;
    }

    check.goal_summary = first_nonempty_line(body(GOAL));
    check.in_scope_summary = first_nonempty_line(body(IN_SCOPE));
    check.acceptance_summary = acceptance_summary(body(ACCEPTANCE_CRITERIA));
    check
}

/// Bucket lines under the most recent required heading.
fn extract_sections(text: &str) -> (HashMap<&'static str, String>, HashSet<&'static str>) {
    let mut buckets: HashMap<&'static str, Vec<&str>> =
        REQUIRED_SECTIONS.iter().map(|name| (*name, Vec::new())).collect();
    let mut present = HashSet::new();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        if let Some(caps) = HEADING.captures(line) {
            let title = caps[1].trim();
            current = REQUIRED_SECTIONS.iter().copied().find(|name| *name == title);
            if let Some(name) = current {
                present.insert(name);
            }
            continue;
        }
        if let Some(name) = current
            && let Some(bucket) = buckets.get_mut(name)
        {
            bucket.push(line.trim_end());
        }
    }

    let sections = buckets
        .into_iter()
        .map(|(name, lines)| (name, lines.join("\n").trim().to_string()))
        .collect();
    (sections, present)
}

fn normalize_summary(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_item_prefix(line: &str) -> &str {
    let raw = line.trim();
    if let Some(caps) = CHECKBOX.captures(raw) {
        return caps.get(1).map_or("", |m| m.as_str().trim());
    }
    if let Some(caps) = LIST_ITEM.captures(raw) {
        return caps.get(1).map_or("", |m| m.as_str().trim());
    }
    raw
}

fn is_list_item(line: &str) -> bool {
    CHECKBOX.is_match(line) || LIST_ITEM.is_match(line)
}

fn first_nonempty_line(section: &str) -> String {
    section
        .lines()
        .map(strip_item_prefix)
        .find(|cleaned| !cleaned.is_empty())
        .map(normalize_summary)
        .unwrap_or_default()
}

fn acceptance_summary(section: &str) -> String {
    let items: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_list_item(line))
        .map(strip_item_prefix)
        .filter(|cleaned| !cleaned.is_empty())
        .take(ACCEPTANCE_SUMMARY_ITEMS)
        .collect();

    if items.is_empty() {
        first_nonempty_line(section)
    } else {
        normalize_summary(&items.join("; "))
    }
}
