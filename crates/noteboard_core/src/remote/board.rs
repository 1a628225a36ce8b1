//! Remote-backed entity store for one workspace's board.
//!
//! # Responsibility
//! - Drive board operations through the gateway, mutate-then-refetch.
//! - Diff caller-supplied note lists against the last fetched state so
//!   only actually-changed fields produce update calls.
//!
//! # Invariants
//! - The cached tree reflects the last confirmed server state only.
//! - Reorder persistence issues per-item order updates sequentially, in
//!   final-position order.
//! - A no-op drag issues no calls.

use crate::export::BoardExport;
use crate::model::board::{
    AppConfig, Note, NoteBlock, NoteBlockPatch, NoteInput, NotePatch, DEFAULT_BLOCK_HEAD,
    DEFAULT_NOTE_HEAD,
};
use crate::model::workspace::{Workspace, WorkspacePatch};
use crate::model::EntityId;
use crate::ordering;
use crate::remote::api::{
    reconcile_workspace, CreateAppDataInput, CreateNoteBlockInput, CreateNoteInput, RemoteApi,
    RemoteError, RemoteResult,
};
use log::{debug, warn};

/// Remote board store bound to one workspace id.
pub struct RemoteBoard<'api, A: RemoteApi> {
    api: &'api A,
    workspace: Workspace,
    app_id: Option<EntityId>,
    data: crate::model::board::BoardData,
}

impl<'api, A: RemoteApi> RemoteBoard<'api, A> {
    /// Fetches one workspace and reconciles it into canonical state.
    pub fn load(api: &'api A, workspace_id: &str) -> RemoteResult<Self> {
        let remote = api.fetch_workspace(workspace_id)?.ok_or_else(|| {
            RemoteError::new(
                "fetch_workspace",
                "workspace_not_found",
                format!("workspace not found: {workspace_id}"),
                false,
            )
        })?;
        let reconciled = reconcile_workspace(remote);
        Ok(Self {
            api,
            workspace: reconciled.workspace,
            app_id: reconciled.app_id,
            data: reconciled.board,
        })
    }

    /// Refetches the workspace, replacing cached state wholesale.
    pub fn refresh(&mut self) -> RemoteResult<()> {
        let remote = self.api.fetch_workspace(&self.workspace.id)?.ok_or_else(|| {
            RemoteError::new(
                "fetch_workspace",
                "workspace_not_found",
                format!("workspace not found: {}", self.workspace.id),
                false,
            )
        })?;
        let reconciled = reconcile_workspace(remote);
        self.workspace = reconciled.workspace;
        self.app_id = reconciled.app_id;
        self.data = reconciled.board;
        Ok(())
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Whether the server holds an app config for this workspace yet.
    pub fn has_app_config(&self) -> bool {
        self.app_id.is_some()
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.data.app_config
    }

    /// Blocks in display order, as last confirmed by the server.
    pub fn note_blocks(&self) -> &[NoteBlock] {
        &self.data.note_blocks
    }

    /// Renames the workspace. Bumps only the workspace's own timestamp.
    pub fn rename_workspace(&mut self, name: impl Into<String>) -> RemoteResult<()> {
        self.api.update_workspace(
            &self.workspace.id,
            &WorkspacePatch {
                name: Some(name.into()),
            },
        )?;
        self.refresh()
    }

    /// Sets the board title; the app config is created lazily on first use.
    pub fn set_board_title(&mut self, title: impl Into<String>) -> RemoteResult<()> {
        let title = title.into();
        match &self.app_id {
            Some(app_id) => self.api.update_app_data(
                app_id,
                &crate::model::board::AppConfigPatch { title: Some(title) },
            )?,
            None => {
                self.api.create_app_data(&CreateAppDataInput {
                    workspace_id: self.workspace.id.clone(),
                    title,
                })?;
            }
        }
        self.refresh()
    }

    /// Creates a block appended at the last position. Requires the app
    /// config to exist (set a board title first).
    pub fn create_note_block(&mut self, head: Option<String>) -> RemoteResult<NoteBlock> {
        let app_id = self.require_app_id("create_note_block")?;
        let created = self.api.create_note_block(&CreateNoteBlockInput {
            app_id,
            head: head.unwrap_or_else(|| DEFAULT_BLOCK_HEAD.to_string()),
        })?;
        self.refresh()?;
        self.data
            .note_blocks
            .iter()
            .find(|block| block.id == created.id)
            .cloned()
            .ok_or_else(|| {
                RemoteError::new(
                    "create_note_block",
                    "refetch_missing",
                    "created block absent from refetched workspace",
                    true,
                )
            })
    }

    pub fn update_note_block(
        &mut self,
        block_id: &str,
        patch: NoteBlockPatch,
    ) -> RemoteResult<()> {
        self.api.update_note_block(block_id, &patch)?;
        self.refresh()
    }

    pub fn delete_note_block(&mut self, block_id: &str) -> RemoteResult<()> {
        self.api.delete_note_block(block_id)?;
        self.refresh()
    }

    /// Creates a note appended to `block_id`.
    pub fn create_note(&mut self, block_id: &str, input: NoteInput) -> RemoteResult<Note> {
        let created = self.api.create_note(&CreateNoteInput {
            block_id: block_id.to_string(),
            head: input.head.unwrap_or_else(|| DEFAULT_NOTE_HEAD.to_string()),
            note: input.note.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
        })?;
        self.refresh()?;
        self.find_note(&created.id).cloned().ok_or_else(|| {
            RemoteError::new(
                "create_note",
                "refetch_missing",
                "created note absent from refetched workspace",
                true,
            )
        })
    }

    pub fn update_note(&mut self, note_id: &str, patch: NotePatch) -> RemoteResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.api.update_note(note_id, &patch)?;
        self.refresh()
    }

    pub fn delete_note(&mut self, note_id: &str) -> RemoteResult<()> {
        self.api.delete_note(note_id)?;
        self.refresh()
    }

    /// Wholesale note-list replacement from the caller's ordering, diffed
    /// against the last fetched state: observable field changes produce one
    /// update each, and every position change persists its `order` even
    /// absent other changes. Unknown note ids are skipped.
    pub fn update_notes(&mut self, block_id: &str, notes: Vec<Note>) -> RemoteResult<()> {
        let previous = match self
            .data
            .note_blocks
            .iter()
            .find(|block| block.id == block_id)
        {
            Some(block) => block.notes.clone(),
            None => return Ok(()),
        };

        let mut issued = 0usize;
        for (position, next) in notes.iter().enumerate() {
            let prev = match previous.iter().find(|note| note.id == next.id) {
                Some(prev) => prev,
                None => {
                    warn!(
                        "event=update_notes module=remote_board status=skipped note_id={} error_code=unknown_note",
                        next.id
                    );
                    continue;
                }
            };

            let mut patch = NotePatch::default();
            if ordering::note_fields_changed(prev, next) {
                if prev.head != next.head {
                    patch.head = Some(next.head.clone());
                }
                if prev.note != next.note {
                    patch.note = Some(next.note.clone());
                }
                if prev.priority != next.priority {
                    patch.priority = Some(next.priority);
                }
                if prev.metadata.completed != next.metadata.completed {
                    patch.completed = Some(next.metadata.completed);
                }
            }
            if prev.order != position as i64 {
                patch.order = Some(position as i64);
            }
            if patch.is_empty() {
                continue;
            }
            self.api.update_note(&next.id, &patch)?;
            issued += 1;
        }

        debug!(
            "event=update_notes module=remote_board status=ok block_id={block_id} issued={issued}"
        );
        if issued == 0 {
            return Ok(());
        }
        self.refresh()
    }

    /// Moves the block at display position `from` to `to`, persisting dense
    /// order values one block at a time in final-position order. Returns
    /// false (no calls) for a no-op drag.
    pub fn reorder_note_blocks(&mut self, from: usize, to: usize) -> RemoteResult<bool> {
        let sequence = match ordering::apply_reorder(self.data.note_blocks.len(), from, to) {
            Some(sequence) => sequence,
            None => return Ok(false),
        };
        for (position, index) in sequence.into_iter().enumerate() {
            let block_id = self.data.note_blocks[index].id.clone();
            self.api
                .update_note_block(&block_id, &NoteBlockPatch::order(position as i64))?;
        }
        self.refresh()?;
        Ok(true)
    }

    /// Moves one note within its block, persisting per-note order updates
    /// sequentially. Cross-block moves are rejected by this store; accepting
    /// them would additionally require re-parenting the note.
    pub fn reorder_notes(&mut self, block_id: &str, from: usize, to: usize) -> RemoteResult<bool> {
        let note_ids: Vec<EntityId> = match self
            .data
            .note_blocks
            .iter()
            .find(|block| block.id == block_id)
        {
            Some(block) => {
                match ordering::apply_reorder(block.notes.len(), from, to) {
                    Some(sequence) => sequence
                        .into_iter()
                        .map(|index| block.notes[index].id.clone())
                        .collect(),
                    None => return Ok(false),
                }
            }
            None => return Ok(false),
        };

        for (position, note_id) in note_ids.iter().enumerate() {
            self.api
                .update_note(note_id, &NotePatch::order(position as i64))?;
        }
        self.refresh()?;
        Ok(true)
    }

    /// Full snapshot of the last confirmed board state.
    pub fn export_data(&self) -> BoardExport {
        BoardExport::new(
            self.data.app_config.clone(),
            self.data.note_blocks.clone(),
        )
    }

    fn find_note(&self, note_id: &str) -> Option<&Note> {
        self.data
            .note_blocks
            .iter()
            .flat_map(|block| block.notes.iter())
            .find(|note| note.id == note_id)
    }

    fn require_app_id(&self, op: &'static str) -> RemoteResult<EntityId> {
        self.app_id.clone().ok_or_else(|| {
            RemoteError::new(
                op,
                "app_config_missing",
                "set a board title before adding blocks",
                false,
            )
        })
    }
}
