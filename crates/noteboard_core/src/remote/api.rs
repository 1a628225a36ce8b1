//! Remote data gateway contract and wire shapes.
//!
//! # Responsibility
//! - Define the request/response API the remote variant is written against.
//! - Mirror the server response nesting (workspace -> appData[] -> blocks ->
//!   notes) and reconcile it into canonical entities.
//!
//! # Invariants
//! - `app_data` is an array on the wire but at most one entry is meaningful;
//!   reconciliation takes the first (arrays-as-singletons).
//! - Sibling display order comes from `order` with array position as the
//!   legacy fallback; reconciled boards carry dense explicit values.

use crate::export::AggregateExport;
use crate::model::board::{
    AppConfig, AppConfigPatch, BoardData, Metadata, Note, NoteBlock, NoteBlockPatch, NoteMetadata,
    NotePatch, Priority, Timestamp,
};
use crate::model::workspace::{Workspace, WorkspacePatch};
use crate::model::EntityId;
use crate::ordering;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by gateway operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Transport/remote failure envelope surfaced to store callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Gateway operation that failed (e.g. `update_note`).
    pub op: &'static str,
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description for user messaging.
    pub message: String,
    /// Whether retrying the same call may succeed.
    pub retryable: bool,
}

impl RemoteError {
    pub fn new(
        op: &'static str,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            op,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "remote {} failed ({}): {}",
            self.op, self.code, self.message
        )
    }
}

impl Error for RemoteError {}

/// Server-shaped workspace with nested board data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWorkspace {
    pub id: EntityId,
    pub name: String,
    pub created: Timestamp,
    pub updated: Timestamp,
    #[serde(default)]
    pub app_data: Vec<RemoteAppData>,
}

/// Server-shaped app config carrying the block tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAppData {
    pub id: EntityId,
    pub title: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub blocks: Vec<RemoteNoteBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNoteBlock {
    pub id: EntityId,
    pub head: String,
    pub order: Option<i64>,
    pub metadata: Metadata,
    #[serde(default)]
    pub notes: Vec<RemoteNote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNote {
    pub id: EntityId,
    pub head: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub priority: Priority,
    pub order: Option<i64>,
    pub metadata: NoteMetadata,
}

/// Create-call input for workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkspaceInput {
    pub name: String,
}

/// Create-call input for app configs (board settings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppDataInput {
    pub workspace_id: EntityId,
    pub title: String,
}

/// Create-call input for note blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBlockInput {
    pub app_id: EntityId,
    pub head: String,
}

/// Create-call input for notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteInput {
    pub block_id: EntityId,
    pub head: String,
    pub note: String,
    pub priority: Priority,
}

/// Request/response gateway against the remote store.
///
/// Calls are issued one at a time; callers needing a deterministic effect
/// order (the reorder loop) await each call before issuing the next.
pub trait RemoteApi {
    fn fetch_workspaces(&self) -> RemoteResult<Vec<RemoteWorkspace>>;
    fn fetch_workspace(&self, id: &str) -> RemoteResult<Option<RemoteWorkspace>>;

    fn create_workspace(&self, input: &CreateWorkspaceInput) -> RemoteResult<RemoteWorkspace>;
    fn update_workspace(&self, id: &str, patch: &WorkspacePatch) -> RemoteResult<()>;
    fn delete_workspace(&self, id: &str) -> RemoteResult<()>;

    fn create_app_data(&self, input: &CreateAppDataInput) -> RemoteResult<RemoteAppData>;
    fn update_app_data(&self, id: &str, patch: &AppConfigPatch) -> RemoteResult<()>;

    fn create_note_block(&self, input: &CreateNoteBlockInput) -> RemoteResult<RemoteNoteBlock>;
    fn update_note_block(&self, id: &str, patch: &NoteBlockPatch) -> RemoteResult<()>;
    fn delete_note_block(&self, id: &str) -> RemoteResult<()>;

    fn create_note(&self, input: &CreateNoteInput) -> RemoteResult<RemoteNote>;
    fn update_note(&self, id: &str, patch: &NotePatch) -> RemoteResult<()>;
    fn delete_note(&self, id: &str) -> RemoteResult<()>;

    /// Bulk import of one aggregate export document.
    fn import_workspaces(&self, doc: &AggregateExport) -> RemoteResult<()>;
}

/// Canonical view of one fetched workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledWorkspace {
    pub workspace: Workspace,
    /// Server-side app config id, when one exists yet.
    pub app_id: Option<EntityId>,
    pub board: BoardData,
}

/// Flattens a server-shaped workspace into the canonical board tree.
pub fn reconcile_workspace(remote: RemoteWorkspace) -> ReconciledWorkspace {
    let workspace = Workspace {
        id: remote.id,
        name: remote.name,
        created: remote.created,
        last_modified: remote.updated,
    };

    // Arrays-as-singletons: only the first app config is meaningful.
    let (app_id, board) = match remote.app_data.into_iter().next() {
        Some(app_data) => {
            let app_id = app_data.id;
            let app_config = AppConfig {
                title: app_data.title,
                metadata: app_data.metadata,
            };
            let mut note_blocks: Vec<NoteBlock> = app_data
                .blocks
                .into_iter()
                .enumerate()
                .map(|(position, block)| reconcile_block(block, position))
                .collect();
            ordering::normalize_board_orders(&mut note_blocks);
            (
                Some(app_id),
                BoardData {
                    app_config,
                    note_blocks,
                },
            )
        }
        None => (None, BoardData::empty()),
    };

    ReconciledWorkspace {
        workspace,
        app_id,
        board,
    }
}

fn reconcile_block(block: RemoteNoteBlock, position: usize) -> NoteBlock {
    let notes = block
        .notes
        .into_iter()
        .enumerate()
        .map(|(note_position, note)| reconcile_note(note, note_position))
        .collect();
    NoteBlock {
        id: block.id,
        head: block.head,
        order: block.order.unwrap_or(position as i64),
        metadata: block.metadata,
        notes,
    }
}

fn reconcile_note(note: RemoteNote, position: usize) -> Note {
    Note {
        id: note.id,
        head: note.head,
        note: note.note,
        priority: note.priority,
        order: note.order.unwrap_or(position as i64),
        metadata: note.metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile_workspace, RemoteAppData, RemoteNote, RemoteNoteBlock, RemoteWorkspace};
    use crate::model::board::{Metadata, NoteMetadata, Priority};
    use chrono::Utc;

    fn remote_note(id: &str, head: &str, order: Option<i64>) -> RemoteNote {
        RemoteNote {
            id: id.to_string(),
            head: head.to_string(),
            note: String::new(),
            priority: Priority::Medium,
            order,
            metadata: NoteMetadata::now(),
        }
    }

    #[test]
    fn takes_first_app_data_entry_and_sorts_by_order() {
        let now = Utc::now();
        let remote = RemoteWorkspace {
            id: "w1".to_string(),
            name: "W1".to_string(),
            created: now,
            updated: now,
            app_data: vec![
                RemoteAppData {
                    id: "app1".to_string(),
                    title: "Board".to_string(),
                    metadata: Metadata::now(),
                    blocks: vec![RemoteNoteBlock {
                        id: "b1".to_string(),
                        head: "Block".to_string(),
                        order: Some(0),
                        metadata: Metadata::now(),
                        notes: vec![
                            remote_note("n1", "second", Some(5)),
                            remote_note("n2", "first", Some(1)),
                        ],
                    }],
                },
                RemoteAppData {
                    id: "app2".to_string(),
                    title: "Ignored".to_string(),
                    metadata: Metadata::now(),
                    blocks: vec![],
                },
            ],
        };

        let reconciled = reconcile_workspace(remote);
        assert_eq!(reconciled.app_id.as_deref(), Some("app1"));
        assert_eq!(reconciled.board.app_config.title, "Board");
        let notes = &reconciled.board.note_blocks[0].notes;
        assert_eq!(notes[0].head, "first");
        assert_eq!(notes[0].order, 0);
        assert_eq!(notes[1].head, "second");
        assert_eq!(notes[1].order, 1);
    }

    #[test]
    fn missing_app_data_yields_empty_board() {
        let now = Utc::now();
        let reconciled = reconcile_workspace(RemoteWorkspace {
            id: "w1".to_string(),
            name: "W1".to_string(),
            created: now,
            updated: now,
            app_data: vec![],
        });
        assert!(reconciled.app_id.is_none());
        assert!(reconciled.board.note_blocks.is_empty());
    }
}
