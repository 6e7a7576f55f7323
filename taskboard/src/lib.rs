//! Task-board readiness and coordination engine.
//!
//! Reads a Markdown task board, per-task spec documents, and worker/lock
//! records from a repository's `.codex-tasks/` state directory, and decides
//! which tasks a new worker may pick up next. The crate keeps a strict split:
//!
//! - **[`core`]**: Pure, deterministic logic (board parsing, dependency
//!   resolution, spec validation, ready partition). No I/O.
//! - **[`io`]**: Side-effecting operations (filesystem, git, process probing).
//!   Isolated so tests can substitute fakes.
//!
//! Orchestration modules ([`ready`], [`status`]) combine both behind an
//! [`engine::EngineContext`] to implement CLI commands.

pub mod core;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod ready;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
