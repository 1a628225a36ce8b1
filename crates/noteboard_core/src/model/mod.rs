//! Canonical domain model for the board/workspace tree.
//!
//! # Responsibility
//! - Define the entity shapes shared by local and remote store variants.
//! - Centralize metadata stamping through explicit patch application.
//!
//! # Invariants
//! - Every entity is identified by a stable opaque string id.
//! - `metadata.updated == metadata.created` until the first mutation.

pub mod board;
pub mod workspace;

use uuid::Uuid;

/// Opaque stable identifier for every entity.
///
/// Generated ids are uuid-v4 strings, but imported documents may carry any
/// unique string (legacy exports used time-based numbers).
pub type EntityId = String;

/// Generates a fresh entity id. Ids are never reused within a workspace.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}
