//! Persistence adapter contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value access contract used by every store variant.
//! - Isolate SQLite details from board/workspace orchestration.
//!
//! # Invariants
//! - Reads through the JSON helpers never fail; they fall back to a
//!   caller-supplied default on missing or corrupt values.

pub mod kv_store;
