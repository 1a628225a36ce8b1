//! Board entities: app config, note blocks and notes.
//!
//! # Responsibility
//! - Define the canonical board tree (`AppConfig` -> `NoteBlock[]` -> `Note[]`).
//! - Provide constructors with contract defaults and patch-merge helpers.
//!
//! # Invariants
//! - `order` is the authoritative sibling display position once assigned.
//! - Patch application is the only place that bumps `metadata.updated`.
//! - `completed` defaults to `false` and lives in note metadata only.

use crate::model::{new_entity_id, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default block display name used when no head is provided.
pub const DEFAULT_BLOCK_HEAD: &str = "New Note Block";
/// Default note title used when no head is provided.
pub const DEFAULT_NOTE_HEAD: &str = "New Todo Item";
/// Default board title for freshly seeded workspaces.
pub const DEFAULT_BOARD_TITLE: &str = "Simple Todo App";

/// Wall-clock timestamp; serialized as an RFC3339/ISO8601 string.
pub type Timestamp = DateTime<Utc>;

/// Note priority. Serialized lowercase to match the exchange format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Creation/update stamps carried by app configs and note blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub created: Timestamp,
    pub updated: Timestamp,
}

impl Metadata {
    /// Fresh stamp with `created == updated`.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            updated: now,
        }
    }

    /// Bumps `updated`, leaving `created` untouched.
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

/// Note stamps; `completed` is note-only state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMetadata {
    pub created: Timestamp,
    pub updated: Timestamp,
    #[serde(default)]
    pub completed: bool,
}

impl NoteMetadata {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            updated: now,
            completed: false,
        }
    }

    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

/// A single task/card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub head: String,
    /// Free-text body; empty when unset.
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub priority: Priority,
    /// Sibling display position within the owning block.
    pub order: i64,
    pub metadata: NoteMetadata,
}

impl Note {
    /// Creates a note from caller input, applying contract defaults.
    pub fn create(input: NoteInput, order: i64) -> Self {
        Self {
            id: new_entity_id(),
            head: input.head.unwrap_or_else(|| DEFAULT_NOTE_HEAD.to_string()),
            note: input.note.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            order,
            metadata: NoteMetadata::now(),
        }
    }

    /// Merges a patch field-by-field and bumps `updated`.
    pub fn apply(&mut self, patch: NotePatch) {
        if let Some(head) = patch.head {
            self.head = head;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.metadata.completed = completed;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        self.metadata.touch();
    }
}

/// A list/column grouping ordered notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteBlock {
    pub id: EntityId,
    pub head: String,
    /// Sibling display position among the board's blocks.
    pub order: i64,
    pub metadata: Metadata,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl NoteBlock {
    pub fn create(input: NoteBlockInput, order: i64) -> Self {
        Self {
            id: new_entity_id(),
            head: input.head.unwrap_or_else(|| DEFAULT_BLOCK_HEAD.to_string()),
            order,
            metadata: Metadata::now(),
            notes: Vec::new(),
        }
    }

    pub fn apply(&mut self, patch: NoteBlockPatch) {
        if let Some(head) = patch.head {
            self.head = head;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        self.metadata.touch();
    }

    /// Next append position: one past the current maximum order.
    pub fn next_note_order(&self) -> i64 {
        self.notes
            .iter()
            .map(|note| note.order)
            .max()
            .map_or(0, |max| max + 1)
    }
}

/// Per-workspace board settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub title: String,
    pub metadata: Metadata,
}

impl AppConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            metadata: Metadata::now(),
        }
    }

    pub fn apply(&mut self, patch: AppConfigPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        self.metadata.touch();
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_TITLE)
    }
}

/// One workspace's full board state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardData {
    pub app_config: AppConfig,
    pub note_blocks: Vec<NoteBlock>,
}

impl BoardData {
    /// Empty board with default settings.
    pub fn empty() -> Self {
        Self {
            app_config: AppConfig::default(),
            note_blocks: Vec::new(),
        }
    }

    /// First-load sample board shown before the user adds content.
    pub fn seed() -> Self {
        let mut block = NoteBlock::create(
            NoteBlockInput {
                head: Some("Sample Note Block".to_string()),
            },
            0,
        );
        let mut note = Note::create(
            NoteInput {
                head: Some("Sample Todo Item".to_string()),
                note: Some("This is a sample todo item description".to_string()),
                priority: Some(Priority::High),
            },
            0,
        );
        // Seed content counts as unmodified data.
        note.metadata.updated = note.metadata.created;
        block.notes.push(note);
        Self {
            app_config: AppConfig::default(),
            note_blocks: vec![block],
        }
    }
}

impl Default for BoardData {
    fn default() -> Self {
        Self::empty()
    }
}

/// Caller input for note creation; all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub head: Option<String>,
    pub note: Option<String>,
    pub priority: Option<Priority>,
}

/// Caller input for block creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteBlockInput {
    pub head: Option<String>,
}

/// Partial note update; absent fields are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub head: Option<String>,
    pub note: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
}

impl NotePatch {
    /// Order-only patch used by reorder persistence.
    pub fn order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial block update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteBlockPatch {
    pub head: Option<String>,
    pub order: Option<i64>,
}

impl NoteBlockPatch {
    pub fn order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }
}

/// Partial app-config update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfigPatch {
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteBlock, NoteBlockInput, NoteInput, NotePatch, Priority};

    #[test]
    fn create_applies_contract_defaults() {
        let note = Note::create(NoteInput::default(), 3);
        assert_eq!(note.head, "New Todo Item");
        assert_eq!(note.note, "");
        assert_eq!(note.priority, Priority::Medium);
        assert_eq!(note.order, 3);
        assert!(!note.metadata.completed);
        assert_eq!(note.metadata.created, note.metadata.updated);

        let block = NoteBlock::create(NoteBlockInput::default(), 0);
        assert_eq!(block.head, "New Note Block");
        assert!(block.notes.is_empty());
    }

    #[test]
    fn apply_preserves_absent_fields_and_created() {
        let mut note = Note::create(
            NoteInput {
                head: Some("Milk".to_string()),
                note: Some("2%".to_string()),
                priority: Some(Priority::Low),
            },
            0,
        );
        let created = note.metadata.created;

        note.apply(NotePatch {
            completed: Some(true),
            ..NotePatch::default()
        });

        assert_eq!(note.head, "Milk");
        assert_eq!(note.note, "2%");
        assert_eq!(note.priority, Priority::Low);
        assert!(note.metadata.completed);
        assert_eq!(note.metadata.created, created);
        assert!(note.metadata.updated >= created);
    }

    #[test]
    fn next_note_order_skips_gaps() {
        let mut block = NoteBlock::create(NoteBlockInput::default(), 0);
        assert_eq!(block.next_note_order(), 0);
        block.notes.push(Note::create(NoteInput::default(), 7));
        assert_eq!(block.next_note_order(), 8);
    }
}
