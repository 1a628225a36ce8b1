//! Workspace entity and registry shapes.
//!
//! # Responsibility
//! - Define the top-level workspace record and the persisted registry
//!   (workspace list + active selection).
//!
//! # Invariants
//! - Exactly one workspace is active once any workspace exists.
//! - The registry list is never empty after seeding.

use crate::model::board::Timestamp;
use crate::model::{new_entity_id, EntityId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Default name for explicitly created workspaces.
pub const DEFAULT_WORKSPACE_NAME: &str = "New Workspace";
/// Name of the workspace seeded on first run.
pub const SEED_WORKSPACE_NAME: &str = "My Workspace";

/// Top-level container isolating one independent board data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: EntityId,
    pub name: String,
    pub created: Timestamp,
    pub last_modified: Timestamp,
}

impl Workspace {
    pub fn create(name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_entity_id(),
            name: name.unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_string()),
            created: now,
            last_modified: now,
        }
    }

    pub fn apply(&mut self, patch: WorkspacePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        self.last_modified = Utc::now();
    }

    /// Bumps `last_modified` without changing other fields.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Partial workspace update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePatch {
    pub name: Option<String>,
}

/// Persisted workspace collection plus active selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRegistry {
    pub list: Vec<Workspace>,
    pub active: EntityId,
}

impl WorkspaceRegistry {
    /// First-run registry: one seed workspace, immediately active.
    pub fn seed() -> Self {
        let workspace = Workspace::create(Some(SEED_WORKSPACE_NAME.to_string()));
        let active = workspace.id.clone();
        Self {
            list: vec![workspace],
            active,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Workspace> {
        self.list.iter().find(|workspace| workspace.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Workspace> {
        self.list.iter_mut().find(|workspace| workspace.id == id)
    }
}
