//! Ready-set computation for `taskboard ready`.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::scheduler::{ReadyPartition, compute_ready};
use crate::core::types::Board;
use crate::engine::EngineContext;
use crate::io::coordination::CoordinationSnapshot;
use crate::io::process::ProcessProbe;

/// Partition the board of an already loaded context.
///
/// Fails when the board is missing; specs and coordination records never
/// abort the computation.
#[instrument(skip_all)]
pub fn ready_tasks<P: ProcessProbe>(ctx: &EngineContext, probe: &P) -> Result<ReadyPartition> {
    let board = ctx.load_board()?;
    let snapshot = ctx.coordination(probe);
    Ok(partition_board(ctx, &board, &snapshot))
}

/// Partition `board` against one coordination snapshot.
pub fn partition_board(
    ctx: &EngineContext,
    board: &Board,
    snapshot: &CoordinationSnapshot,
) -> ReadyPartition {
    let partition = compute_ready(
        &board.tasks,
        &board.gates,
        |task| ctx.spec_for(task),
        |task| snapshot.claim_for(task),
    );
    debug!(
        ready = partition.ready_tasks.len(),
        excluded = partition.excluded_tasks.len(),
        "ready set computed"
    );
    partition
}

/// Load context for `root` and compute the ready set.
pub fn ready_from_root<P: ProcessProbe>(
    root: &Path,
    config_path: Option<&Path>,
    probe: &P,
) -> Result<ReadyPartition> {
    let ctx = EngineContext::load(root, config_path)?;
    ready_tasks(&ctx, probe)
}
