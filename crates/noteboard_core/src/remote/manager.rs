//! Workspace lifecycle against the remote gateway.
//!
//! # Responsibility
//! - List/create/delete/switch workspaces through the gateway; only the
//!   active-workspace selection lives in the local key-value store.
//!
//! # Invariants
//! - The last remaining workspace is never deleted.
//! - Deleting the active workspace reassigns activation to the first
//!   remaining workspace before any state is dropped.

use crate::export::{parse_aggregate_document, AggregateExport, WorkspaceExportEntry};
use crate::model::workspace::{Workspace, DEFAULT_WORKSPACE_NAME};
use crate::model::EntityId;
use crate::remote::api::{reconcile_workspace, CreateWorkspaceInput, RemoteApi, RemoteError};
use crate::repo::kv_store::{KeyValueStore, KvError, ACTIVE_WORKSPACE_KEY};
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures from the remote manager: gateway errors or local session-state
/// persistence errors.
#[derive(Debug)]
pub enum RemoteStoreError {
    Remote(RemoteError),
    Kv(KvError),
}

impl Display for RemoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "remote store failed: {err}"),
            Self::Kv(err) => write!(f, "session state store failed: {err}"),
        }
    }
}

impl Error for RemoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Kv(err) => Some(err),
        }
    }
}

impl From<RemoteError> for RemoteStoreError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<KvError> for RemoteStoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

pub type RemoteStoreResult<T> = Result<T, RemoteStoreError>;

/// Workspace manager backed by the gateway for entity state and the local
/// key-value store for the active-workspace session key.
pub struct RemoteWorkspaceManager<'a, A: RemoteApi, S: KeyValueStore> {
    api: &'a A,
    kv: &'a S,
}

impl<'a, A: RemoteApi, S: KeyValueStore> RemoteWorkspaceManager<'a, A, S> {
    pub fn new(api: &'a A, kv: &'a S) -> Self {
        Self { api, kv }
    }

    /// All workspaces, reconciled to canonical shape. Board trees are
    /// dropped here; `RemoteBoard::load` refetches per workspace.
    pub fn list_workspaces(&self) -> RemoteStoreResult<Vec<Workspace>> {
        let workspaces = self
            .api
            .fetch_workspaces()?
            .into_iter()
            .map(|remote| reconcile_workspace(remote).workspace)
            .collect();
        Ok(workspaces)
    }

    /// The locally remembered workspace selection, if any.
    pub fn active_workspace_id(&self) -> Option<EntityId> {
        self.kv.get_json_or::<Option<EntityId>>(ACTIVE_WORKSPACE_KEY, None)
    }

    /// Remembers `workspace_id` as the active selection. The id is not
    /// validated against the server; a stale selection surfaces as
    /// `workspace_not_found` on the next board load.
    pub fn switch_workspace(&self, workspace_id: &str) -> RemoteStoreResult<()> {
        self.kv
            .set_json(ACTIVE_WORKSPACE_KEY, &workspace_id.to_string())?;
        info!("event=switch_workspace module=remote_manager status=ok workspace_id={workspace_id}");
        Ok(())
    }

    /// Creates a workspace and activates it. A blank name takes the default.
    pub fn create_workspace(&self, name: &str) -> RemoteStoreResult<Workspace> {
        let name = {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                DEFAULT_WORKSPACE_NAME.to_string()
            } else {
                trimmed.to_string()
            }
        };
        let created = self
            .api
            .create_workspace(&CreateWorkspaceInput { name })?;
        let workspace = reconcile_workspace(created).workspace;
        self.kv.set_json(ACTIVE_WORKSPACE_KEY, &workspace.id)?;
        info!(
            "event=create_workspace module=remote_manager status=ok workspace_id={}",
            workspace.id
        );
        Ok(workspace)
    }

    /// Deletes a workspace. Returns false without any call when the id is
    /// unknown or only one workspace remains. When the deleted workspace was
    /// active, activation moves to the first remaining one.
    pub fn delete_workspace(&self, workspace_id: &str) -> RemoteStoreResult<bool> {
        let workspaces = self.api.fetch_workspaces()?;
        if !workspaces.iter().any(|workspace| workspace.id == workspace_id) {
            return Ok(false);
        }
        if workspaces.len() <= 1 {
            warn!(
                "event=delete_workspace module=remote_manager status=rejected workspace_id={workspace_id} error_code=last_workspace"
            );
            return Ok(false);
        }

        self.api.delete_workspace(workspace_id)?;
        if self.active_workspace_id().as_deref() == Some(workspace_id) {
            let successor = workspaces
                .iter()
                .find(|workspace| workspace.id != workspace_id)
                .map(|workspace| workspace.id.clone());
            if let Some(successor) = successor {
                self.kv.set_json(ACTIVE_WORKSPACE_KEY, &successor)?;
            }
        }
        info!(
            "event=delete_workspace module=remote_manager status=ok workspace_id={workspace_id}"
        );
        Ok(true)
    }

    /// Aggregate export of every workspace with its board inline.
    pub fn export_all_workspaces(&self) -> RemoteStoreResult<AggregateExport> {
        let entries = self
            .api
            .fetch_workspaces()?
            .into_iter()
            .map(|remote| {
                let reconciled = reconcile_workspace(remote);
                WorkspaceExportEntry {
                    workspace: reconciled.workspace,
                    data: reconciled.board,
                }
            })
            .collect();
        Ok(AggregateExport::new(entries))
    }

    /// Replaces all remote workspaces from an aggregate document. Returns
    /// false, issuing no calls, when the document is malformed or names no
    /// workspaces. The first imported workspace becomes active.
    pub fn import_all_workspaces(&self, doc: &Value) -> RemoteStoreResult<bool> {
        let entries = match parse_aggregate_document(doc) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=import_all module=remote_manager status=rejected error=\"{err}\""
                );
                return Ok(false);
            }
        };
        if entries.is_empty() {
            warn!("event=import_all module=remote_manager status=rejected error_code=empty_workspace_list");
            return Ok(false);
        }

        let first_id = entries[0].workspace.id.clone();
        let count = entries.len();
        self.api.import_workspaces(&AggregateExport::new(entries))?;
        self.kv.set_json(ACTIVE_WORKSPACE_KEY, &first_id)?;
        info!("event=import_all module=remote_manager status=ok workspaces={count}");
        Ok(true)
    }
}
