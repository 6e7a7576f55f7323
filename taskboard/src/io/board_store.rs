//! Board loading from disk.

use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::board::{BoardSchema, parse_board_text};
use crate::core::types::Board;
use crate::error::{EngineError, Result};

/// Read and parse the board file.
///
/// A missing file is [`EngineError::BoardNotFound`]; row-level problems are
/// never errors.
pub fn parse_board(path: &Path, schema: &BoardSchema) -> Result<Board> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(EngineError::BoardNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(EngineError::io(path, err)),
    };
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        warn!(path = %path.display(), "board is not valid UTF-8, invalid bytes replaced");
    }
    let board = parse_board_text(&text, schema);
    debug!(
        path = %path.display(),
        tasks = board.tasks.len(),
        gates = board.gates.len(),
        "board parsed"
    );
    Ok(board)
}
