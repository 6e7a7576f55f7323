//! Deterministic, pure logic shared by the readiness engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod board;
pub mod deps;
pub mod markdown;
pub mod scheduler;
pub mod spec_doc;
pub mod types;
