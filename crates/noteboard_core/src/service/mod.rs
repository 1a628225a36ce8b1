//! Store orchestration over the persistence adapter.
//!
//! # Responsibility
//! - Own the canonical in-memory board/workspace state for the local
//!   deployment variant and persist every mutation.
//! - Keep UI layers decoupled from storage details.
//!
//! # Invariants
//! - Operations targeting missing ids are silent no-ops, never errors.
//! - Storage failures surface as `StoreError`; the canonical in-memory
//!   tree is never left partially mutated by a failed persist.

use crate::repo::kv_store::KvError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod board_store;
pub mod workspace_manager;

/// Result type used by board/workspace store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Persistence adapter failure.
    Kv(KvError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}
