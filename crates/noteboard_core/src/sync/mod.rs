//! Background persistence of the aggregate export.
//!
//! # Responsibility
//! - Debounce repeated data changes into one file write per quiet period.
//!
//! # Invariants
//! - Sync failures surface only through the status string; they never
//!   propagate into or block store operations.

pub mod autosync;
