//! Task-board readiness and coordination CLI.
//!
//! Reads `.codex-tasks/planning/TODO.md`, the per-task specs, and the worker
//! and lock records next to it, and reports which tasks are ready to claim.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use taskboard::error::EngineError;
use taskboard::exit_codes;
use taskboard::io::git::resolve_repo_root;
use taskboard::io::init::{StatePaths, bootstrap_board};
use taskboard::io::process::SystemProbe;
use taskboard::logging;
use taskboard::ready::ready_from_root;
use taskboard::status::{StatusFormat, render_tui, status_from_root};

#[derive(Parser)]
#[command(
    name = "taskboard",
    version,
    about = "Task-board readiness and coordination engine"
)]
struct Cli {
    /// Repository root. Defaults to the git toplevel of the current dir.
    #[arg(long, global = true)]
    repo: Option<PathBuf>,
    /// Config file. Defaults to `.codex-tasks/orchestrator.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print ready and excluded tasks as JSON.
    Ready,
    /// Print the unified scheduler, runtime, and board status.
    Status {
        #[arg(long, value_enum, default_value_t = StatusFormat::Json)]
        format: StatusFormat,
    },
    /// Create the task board template if missing.
    Init,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = match cli.repo {
        Some(repo) => repo,
        None => {
            let cwd = std::env::current_dir().context("resolve current directory")?;
            resolve_repo_root(&cwd)
        }
    };
    let config = cli.config.as_deref();

    match cli.command {
        Command::Ready => cmd_ready(&root, config),
        Command::Status { format } => cmd_status(&root, config, format),
        Command::Init => cmd_init(&root),
    }
}

fn cmd_ready(root: &Path, config: Option<&Path>) -> Result<()> {
    let partition = ready_from_root(root, config, &SystemProbe)?;
    print_json(&partition)
}

fn cmd_status(root: &Path, config: Option<&Path>, format: StatusFormat) -> Result<()> {
    let snapshot = status_from_root(root, config, &SystemProbe)?;
    match format {
        StatusFormat::Json => print_json(&snapshot),
        StatusFormat::Tui => {
            print!("{}", render_tui(&snapshot, std::io::stdout().is_terminal()));
            Ok(())
        }
    }
}

fn cmd_init(root: &Path) -> Result<()> {
    let paths = StatePaths::new(root);
    bootstrap_board(&paths.board_path).context("bootstrap task board")?;
    println!("{}", paths.board_path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let board_missing = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<EngineError>(),
            Some(EngineError::BoardNotFound(_))
        )
    });
    if board_missing {
        exit_codes::BOARD_MISSING
    } else {
        exit_codes::INVALID
    }
}
