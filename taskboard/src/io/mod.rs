//! I/O helpers for engine commands.

pub mod board_store;
pub mod config;
pub mod coordination;
pub mod git;
pub mod init;
pub mod process;
pub mod spec_store;
