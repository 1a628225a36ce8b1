//! Local-variant entity store for one workspace's board.
//!
//! # Responsibility
//! - Own the canonical `{appConfig, noteBlocks[], notes[]}` tree for the
//!   selected workspace and persist it wholesale through the key-value
//!   adapter on every mutation.
//! - Stamp lifecycle metadata centrally via the model patch helpers.
//!
//! # Invariants
//! - `note_blocks` is always held in display order with dense `order`
//!   values; legacy documents are normalized on load.
//! - Mutations referencing absent block/note ids are silent no-ops.
//! - Export never mutates state; import replaces it all-or-nothing.

use crate::export::{self, BoardExport, BoardImport};
use crate::model::board::{
    AppConfigPatch, BoardData, Note, NoteBlock, NoteBlockInput, NoteBlockPatch, NoteInput,
    NotePatch,
};
use crate::model::EntityId;
use crate::ordering;
use crate::repo::kv_store::{workspace_data_key, KeyValueStore};
use crate::service::StoreResult;
use log::{info, warn};
use serde_json::Value;

/// Board store bound to one workspace id.
pub struct BoardStore<'kv, S: KeyValueStore> {
    kv: &'kv S,
    workspace_id: EntityId,
    data: BoardData,
}

impl<'kv, S: KeyValueStore> BoardStore<'kv, S> {
    /// Loads the board for `workspace_id`, seeding the sample board when
    /// nothing is stored yet and normalizing legacy order values.
    ///
    /// A stored value that cannot be parsed is treated like a missing one;
    /// the previous content is unrecoverable at this layer.
    pub fn load(kv: &'kv S, workspace_id: impl Into<EntityId>) -> StoreResult<Self> {
        let workspace_id = workspace_id.into();
        let key = workspace_data_key(&workspace_id);

        let data = match kv.get_raw(&key)? {
            Some(raw) => parse_stored_board(&raw).unwrap_or_else(|| {
                warn!(
                    "event=board_load module=board_store status=error workspace_id={workspace_id} error_code=invalid_stored_board"
                );
                BoardData::seed()
            }),
            None => BoardData::seed(),
        };

        let store = Self {
            kv,
            workspace_id,
            data,
        };
        // Write-back persists the seed and any load-time normalization.
        store.persist()?;
        Ok(store)
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Blocks in display order.
    pub fn note_blocks(&self) -> &[NoteBlock] {
        &self.data.note_blocks
    }

    pub fn app_config(&self) -> &crate::model::board::AppConfig {
        &self.data.app_config
    }

    /// Creates a block appended at the last position.
    pub fn create_note_block(&mut self, input: NoteBlockInput) -> StoreResult<NoteBlock> {
        let order = self
            .data
            .note_blocks
            .iter()
            .map(|block| block.order)
            .max()
            .map_or(0, |max| max + 1);
        let block = NoteBlock::create(input, order);
        self.data.note_blocks.push(block.clone());
        self.persist()?;
        Ok(block)
    }

    /// Merges fields into the matching block; absent ids are a no-op.
    pub fn update_note_block(&mut self, block_id: &str, patch: NoteBlockPatch) -> StoreResult<()> {
        match self.block_mut(block_id) {
            Some(block) => block.apply(patch),
            None => return Ok(()),
        }
        self.persist()
    }

    /// Removes the block and all of its notes. Irreversible.
    pub fn delete_note_block(&mut self, block_id: &str) -> StoreResult<()> {
        let before = self.data.note_blocks.len();
        self.data.note_blocks.retain(|block| block.id != block_id);
        if self.data.note_blocks.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Creates a note appended to `block_id`; returns `None` when the block
    /// does not exist.
    pub fn create_note(&mut self, block_id: &str, input: NoteInput) -> StoreResult<Option<Note>> {
        let note = match self.block_mut(block_id) {
            Some(block) => {
                let note = Note::create(input, block.next_note_order());
                block.notes.push(note.clone());
                block.metadata.touch();
                note
            }
            None => return Ok(None),
        };
        self.persist()?;
        Ok(Some(note))
    }

    /// Merges fields into the matching note, re-stamping the note and its
    /// parent block. Absent ids are a no-op.
    pub fn update_note(
        &mut self,
        block_id: &str,
        note_id: &str,
        patch: NotePatch,
    ) -> StoreResult<()> {
        match self.block_mut(block_id) {
            Some(block) => {
                match block.notes.iter_mut().find(|note| note.id == note_id) {
                    Some(note) => note.apply(patch),
                    None => return Ok(()),
                }
                block.metadata.touch();
            }
            None => return Ok(()),
        }
        self.persist()
    }

    /// Wholesale replacement of a block's note list with a caller-supplied
    /// ordering; positions become the notes' explicit `order` values.
    pub fn update_notes(&mut self, block_id: &str, mut notes: Vec<Note>) -> StoreResult<()> {
        ordering::assign_note_orders(&mut notes);
        match self.block_mut(block_id) {
            Some(block) => block.notes = notes,
            None => return Ok(()),
        }
        self.persist()
    }

    /// Removes one note, re-stamping the parent block.
    pub fn delete_note(&mut self, block_id: &str, note_id: &str) -> StoreResult<()> {
        match self.block_mut(block_id) {
            Some(block) => {
                let before = block.notes.len();
                block.notes.retain(|note| note.id != note_id);
                if block.notes.len() == before {
                    return Ok(());
                }
                block.metadata.touch();
            }
            None => return Ok(()),
        }
        self.persist()
    }

    /// Merges fields into the app config.
    pub fn update_app_config(&mut self, patch: AppConfigPatch) -> StoreResult<()> {
        self.data.app_config.apply(patch);
        self.persist()
    }

    /// Moves the block at display position `from` to `to`, reassigning dense
    /// order values. Returns false (no writes) for a no-op drag.
    pub fn reorder_note_block(&mut self, from: usize, to: usize) -> StoreResult<bool> {
        let sequence = match ordering::apply_reorder(self.data.note_blocks.len(), from, to) {
            Some(sequence) => sequence,
            None => return Ok(false),
        };
        self.data.note_blocks = sequence
            .into_iter()
            .map(|index| self.data.note_blocks[index].clone())
            .collect();
        ordering::assign_block_orders(&mut self.data.note_blocks);
        self.persist()?;
        Ok(true)
    }

    /// Moves the note at display position `from` to `to` within one block.
    /// Cross-block moves are not part of this path.
    pub fn reorder_note(&mut self, block_id: &str, from: usize, to: usize) -> StoreResult<bool> {
        let changed = match self.block_mut(block_id) {
            Some(block) => match ordering::apply_reorder(block.notes.len(), from, to) {
                Some(sequence) => {
                    block.notes = sequence
                        .into_iter()
                        .map(|index| block.notes[index].clone())
                        .collect();
                    ordering::assign_note_orders(&mut block.notes);
                    true
                }
                None => false,
            },
            None => false,
        };
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    /// Full snapshot of this workspace's board. Never mutates state.
    pub fn export_data(&self) -> BoardExport {
        BoardExport::new(
            self.data.app_config.clone(),
            self.data.note_blocks.clone(),
        )
    }

    /// Replaces the board from an import document. Returns false and leaves
    /// state untouched when the document is malformed.
    pub fn import_data(&mut self, doc: &Value) -> StoreResult<bool> {
        let BoardImport {
            app_config,
            note_blocks,
        } = match export::parse_board_document(doc) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    "event=board_import module=board_store status=rejected workspace_id={} error={err}",
                    self.workspace_id
                );
                return Ok(false);
            }
        };

        if let Some(app_config) = app_config {
            self.data.app_config = app_config;
        }
        self.data.note_blocks = note_blocks;
        self.persist()?;
        info!(
            "event=board_import module=board_store status=ok workspace_id={} blocks={}",
            self.workspace_id,
            self.data.note_blocks.len()
        );
        Ok(true)
    }

    fn block_mut(&mut self, block_id: &str) -> Option<&mut NoteBlock> {
        self.data
            .note_blocks
            .iter_mut()
            .find(|block| block.id == block_id)
    }

    fn persist(&self) -> StoreResult<()> {
        let key = workspace_data_key(&self.workspace_id);
        self.kv.set_json(&key, &self.data)?;
        Ok(())
    }
}

/// Parses a stored board value leniently; `None` when unusable.
pub(crate) fn parse_stored_board(raw: &str) -> Option<BoardData> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let parsed = export::parse_board_document(&value).ok()?;
    Some(BoardData {
        app_config: parsed.app_config.unwrap_or_default(),
        note_blocks: parsed.note_blocks,
    })
}
