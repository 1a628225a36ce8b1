//! Local-variant workspace collection and active selection.
//!
//! # Responsibility
//! - Own the workspace registry (list + active id) and persist it.
//! - Cascade board-data deletion and aggregate import/export across all
//!   workspaces.
//!
//! # Invariants
//! - The workspace set is never empty; deleting the last workspace is
//!   rejected.
//! - Exactly one workspace is active; deleting the active one promotes the
//!   first remaining workspace in the same operation.

use crate::export::{self, AggregateExport, WorkspaceExportEntry};
use crate::model::board::BoardData;
use crate::model::workspace::{Workspace, WorkspacePatch, WorkspaceRegistry};
use crate::model::EntityId;
use crate::repo::kv_store::{workspace_data_key, KeyValueStore, WORKSPACES_KEY};
use crate::service::board_store::parse_stored_board;
use crate::service::StoreResult;
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeSet;

/// Workspace manager over the persistence adapter.
pub struct WorkspaceManager<'kv, S: KeyValueStore> {
    kv: &'kv S,
    registry: WorkspaceRegistry,
}

impl<'kv, S: KeyValueStore> WorkspaceManager<'kv, S> {
    /// Loads the registry, seeding a single default workspace on first run
    /// and repairing a corrupt or inconsistent stored registry.
    pub fn load(kv: &'kv S) -> StoreResult<Self> {
        let mut registry = match kv.get_json_or::<Option<WorkspaceRegistry>>(WORKSPACES_KEY, None)
        {
            Some(registry) => registry,
            None => WorkspaceRegistry::seed(),
        };

        if registry.list.is_empty() {
            warn!("event=registry_load module=workspace_manager status=repair reason=empty_list");
            registry = WorkspaceRegistry::seed();
        } else if !registry
            .list
            .iter()
            .any(|workspace| workspace.id == registry.active)
        {
            warn!("event=registry_load module=workspace_manager status=repair reason=stale_active");
            registry.active = registry.list[0].id.clone();
        }

        let manager = Self { kv, registry };
        manager.persist()?;
        Ok(manager)
    }

    /// Workspaces in stable list order.
    pub fn workspaces(&self) -> &[Workspace] {
        &self.registry.list
    }

    /// Id of the currently active workspace.
    pub fn active_id(&self) -> &str {
        &self.registry.active
    }

    pub fn get(&self, id: &str) -> Option<&Workspace> {
        self.registry.get(id)
    }

    /// Creates a workspace (name falls back to the default when blank) and
    /// makes it active.
    pub fn create_workspace(&mut self, name: &str) -> StoreResult<EntityId> {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        let workspace = Workspace::create(name);
        let id = workspace.id.clone();
        self.registry.list.push(workspace);
        self.registry.active = id.clone();
        self.persist()?;
        info!("event=workspace_create module=workspace_manager status=ok workspace_id={id}");
        Ok(id)
    }

    /// Deletes one workspace with its board data. Returns false without any
    /// change when it is the last workspace or the id is unknown.
    pub fn delete_workspace(&mut self, id: &str) -> StoreResult<bool> {
        if self.registry.list.len() <= 1 {
            info!(
                "event=workspace_delete module=workspace_manager status=rejected reason=last_workspace workspace_id={id}"
            );
            return Ok(false);
        }
        if self.registry.get(id).is_none() {
            return Ok(false);
        }

        self.registry.list.retain(|workspace| workspace.id != id);
        if self.registry.active == id {
            self.registry.active = self.registry.list[0].id.clone();
        }
        self.persist()?;
        self.kv.remove(&workspace_data_key(id))?;
        info!("event=workspace_delete module=workspace_manager status=ok workspace_id={id}");
        Ok(true)
    }

    /// Sets the active workspace; unknown ids are a no-op. The selection is
    /// persisted and survives reloads.
    pub fn switch_workspace(&mut self, id: &str) -> StoreResult<()> {
        if self.registry.get(id).is_none() {
            return Ok(());
        }
        self.registry.active = id.to_string();
        self.persist()
    }

    /// Merges metadata fields into one workspace, re-stamping
    /// `last_modified`.
    pub fn update_workspace(&mut self, id: &str, patch: WorkspacePatch) -> StoreResult<()> {
        match self.registry.get_mut(id) {
            Some(workspace) => workspace.apply(patch),
            None => return Ok(()),
        }
        self.persist()
    }

    /// Bumps one workspace's `last_modified`; the local variant calls this
    /// after any mutation of the workspace's descendants.
    pub fn touch(&mut self, id: &str) -> StoreResult<()> {
        match self.registry.get_mut(id) {
            Some(workspace) => workspace.touch(),
            None => return Ok(()),
        }
        self.persist()
    }

    /// Aggregate snapshot across all workspaces, each with its board data
    /// inline. Workspaces never opened export an empty board.
    pub fn export_all_workspaces(&self) -> StoreResult<AggregateExport> {
        let mut entries = Vec::with_capacity(self.registry.list.len());
        for workspace in &self.registry.list {
            let data = match self.kv.get_raw(&workspace_data_key(&workspace.id))? {
                Some(raw) => parse_stored_board(&raw).unwrap_or_else(BoardData::empty),
                None => BoardData::empty(),
            };
            entries.push(WorkspaceExportEntry {
                workspace: workspace.clone(),
                data,
            });
        }
        Ok(AggregateExport::new(entries))
    }

    /// Replaces the entire workspace list from an aggregate document and
    /// activates the first imported workspace. Returns false with no change
    /// on malformed input (including an empty workspace list).
    pub fn import_all_workspaces(&mut self, doc: &Value) -> StoreResult<bool> {
        let entries = match export::parse_aggregate_document(doc) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=workspace_import module=workspace_manager status=rejected error={err}"
                );
                return Ok(false);
            }
        };
        if entries.is_empty() {
            warn!(
                "event=workspace_import module=workspace_manager status=rejected reason=no_workspaces"
            );
            return Ok(false);
        }

        let previous_ids: BTreeSet<String> = self
            .registry
            .list
            .iter()
            .map(|workspace| workspace.id.clone())
            .collect();

        let mut list = Vec::with_capacity(entries.len());
        for entry in &entries {
            self.kv
                .set_json(&workspace_data_key(&entry.workspace.id), &entry.data)?;
            list.push(entry.workspace.clone());
        }

        let imported_ids: BTreeSet<String> =
            list.iter().map(|workspace| workspace.id.clone()).collect();
        self.registry.active = list[0].id.clone();
        self.registry.list = list;
        self.persist()?;

        // Board data of replaced workspaces would otherwise leak in storage.
        for stale in previous_ids.difference(&imported_ids) {
            self.kv.remove(&workspace_data_key(stale))?;
        }

        info!(
            "event=workspace_import module=workspace_manager status=ok count={}",
            imported_ids.len()
        );
        Ok(true)
    }

    fn persist(&self) -> StoreResult<()> {
        self.kv.set_json(WORKSPACES_KEY, &self.registry)?;
        Ok(())
    }
}
