//! Versioned import/export document handling.
//!
//! # Responsibility
//! - Produce the single-workspace and aggregate export documents.
//! - Validate and leniently parse import documents into canonical entities.
//!
//! # Invariants
//! - Export never mutates store state.
//! - Import is all-or-nothing: a malformed document yields an error and the
//!   caller applies no partial state.
//! - Imported entities missing an id get a fresh one; missing `created`
//!   defaults to now; missing `order` falls back to array position.

use crate::model::board::{
    AppConfig, BoardData, Metadata, Note, NoteBlock, NoteMetadata, Priority, Timestamp,
    DEFAULT_BLOCK_HEAD, DEFAULT_NOTE_HEAD,
};
use crate::model::workspace::Workspace;
use crate::model::{new_entity_id, EntityId};
use chrono::Utc;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Version stamp written into every export document.
pub const EXPORT_VERSION: &str = "1.0";

/// Default name for imported workspaces that carry none.
const IMPORTED_WORKSPACE_NAME: &str = "Imported Workspace";

/// Single-workspace export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardExport {
    pub export_date: Timestamp,
    pub version: String,
    pub app_config: AppConfig,
    pub note_blocks: Vec<NoteBlock>,
}

impl BoardExport {
    pub fn new(app_config: AppConfig, note_blocks: Vec<NoteBlock>) -> Self {
        Self {
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
            app_config,
            note_blocks,
        }
    }
}

/// One workspace entry inside the aggregate document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceExportEntry {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub data: BoardData,
}

/// Aggregate export document carrying every workspace with its board inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateExport {
    pub export_date: Timestamp,
    pub version: String,
    pub workspaces: Vec<WorkspaceExportEntry>,
}

impl AggregateExport {
    pub fn new(workspaces: Vec<WorkspaceExportEntry>) -> Self {
        Self {
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
            workspaces,
        }
    }
}

/// Parsed single-workspace import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardImport {
    /// Absent when the document carries no `appConfig`; the importing store
    /// keeps its current config in that case.
    pub app_config: Option<AppConfig>,
    pub note_blocks: Vec<NoteBlock>,
}

/// Import validation errors. All are rejected before any state mutation.
#[derive(Debug)]
pub enum ImportError {
    /// Document root is not a JSON object.
    NotAnObject,
    /// `noteBlocks` is missing or not an array.
    MissingNoteBlocks,
    /// `workspaces` is missing or not an array.
    MissingWorkspaces,
    /// A present field has an unusable shape or value.
    Malformed(String),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "import document must be a JSON object"),
            Self::MissingNoteBlocks => {
                write!(f, "import document requires a `noteBlocks` array")
            }
            Self::MissingWorkspaces => {
                write!(f, "import document requires a `workspaces` array")
            }
            Self::Malformed(message) => write!(f, "malformed import document: {message}"),
        }
    }
}

impl Error for ImportError {}

/// Validates and parses a single-workspace document
/// (`{exportDate, version, appConfig?, noteBlocks}`).
pub fn parse_board_document(doc: &Value) -> Result<BoardImport, ImportError> {
    let object = doc.as_object().ok_or(ImportError::NotAnObject)?;
    match object.get("noteBlocks") {
        Some(Value::Array(_)) => {}
        _ => return Err(ImportError::MissingNoteBlocks),
    }

    let raw: RawBoardPayload = serde_json::from_value(doc.clone())
        .map_err(|err| ImportError::Malformed(err.to_string()))?;

    Ok(BoardImport {
        app_config: raw.app_config.map(finalize_app_config),
        note_blocks: finalize_blocks(raw.note_blocks.unwrap_or_default()),
    })
}

/// Validates and parses an aggregate document (`{..., workspaces: [...]}`),
/// defaulting missing ids, names and timestamps per entry.
pub fn parse_aggregate_document(doc: &Value) -> Result<Vec<WorkspaceExportEntry>, ImportError> {
    let object = doc.as_object().ok_or(ImportError::NotAnObject)?;
    match object.get("workspaces") {
        Some(Value::Array(_)) => {}
        _ => return Err(ImportError::MissingWorkspaces),
    }

    let raw: RawAggregateDocument = serde_json::from_value(doc.clone())
        .map_err(|err| ImportError::Malformed(err.to_string()))?;

    let now = Utc::now();
    let entries = raw
        .workspaces
        .into_iter()
        .map(|entry| {
            let data = entry
                .data
                .map(finalize_board_payload)
                .unwrap_or_else(BoardData::empty);
            WorkspaceExportEntry {
                workspace: Workspace {
                    id: entry.id.unwrap_or_else(new_entity_id),
                    name: entry
                        .name
                        .unwrap_or_else(|| IMPORTED_WORKSPACE_NAME.to_string()),
                    created: entry.created.unwrap_or(now),
                    last_modified: now,
                },
                data,
            }
        })
        .collect();
    Ok(entries)
}

/// Lenient board payload finalization used by aggregate entries, where a
/// missing or empty `data` object is tolerated.
fn finalize_board_payload(raw: RawBoardPayload) -> BoardData {
    BoardData {
        app_config: raw.app_config.map(finalize_app_config).unwrap_or_default(),
        note_blocks: finalize_blocks(raw.note_blocks.unwrap_or_default()),
    }
}

fn finalize_blocks(raw_blocks: Vec<RawNoteBlock>) -> Vec<NoteBlock> {
    let mut blocks: Vec<NoteBlock> = raw_blocks
        .into_iter()
        .enumerate()
        .map(|(position, raw)| finalize_block(raw, position))
        .collect();
    crate::ordering::normalize_board_orders(&mut blocks);
    blocks
}

fn finalize_block(raw: RawNoteBlock, position: usize) -> NoteBlock {
    let metadata = finalize_metadata(raw.metadata);
    let notes = raw
        .notes
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(note_position, note)| finalize_note(note, note_position))
        .collect();
    NoteBlock {
        id: raw.id.unwrap_or_else(new_entity_id),
        head: raw.head.unwrap_or_else(|| DEFAULT_BLOCK_HEAD.to_string()),
        order: raw.order.unwrap_or(position as i64),
        metadata,
        notes,
    }
}

fn finalize_note(raw: RawNote, position: usize) -> Note {
    let (created, updated, completed) = match raw.metadata {
        Some(metadata) => {
            let created = metadata.created.unwrap_or_else(Utc::now);
            (
                created,
                metadata.updated.unwrap_or(created),
                metadata.completed.unwrap_or(false),
            )
        }
        None => {
            let now = Utc::now();
            (now, now, false)
        }
    };
    Note {
        id: raw.id.unwrap_or_else(new_entity_id),
        head: raw.head.unwrap_or_else(|| DEFAULT_NOTE_HEAD.to_string()),
        note: raw.note.unwrap_or_default(),
        priority: raw.priority.unwrap_or_default(),
        order: raw.order.unwrap_or(position as i64),
        metadata: NoteMetadata {
            created,
            updated,
            completed,
        },
    }
}

fn finalize_app_config(raw: RawAppConfig) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(title) = raw.title {
        config.title = title;
    }
    if let Some(metadata) = raw.metadata {
        let created = metadata.created.unwrap_or(config.metadata.created);
        config.metadata = Metadata {
            created,
            updated: metadata.updated.unwrap_or(created),
        };
    }
    config
}

fn finalize_metadata(raw: Option<RawMetadata>) -> Metadata {
    match raw {
        Some(metadata) => {
            let created = metadata.created.unwrap_or_else(Utc::now);
            Metadata {
                created,
                updated: metadata.updated.unwrap_or(created),
            }
        }
        None => Metadata::now(),
    }
}

/// Accepts string or number ids from legacy documents; numbers stringify.
fn opt_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(other) => Err(D::Error::custom(format!("invalid id value: {other}"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoardPayload {
    app_config: Option<RawAppConfig>,
    note_blocks: Option<Vec<RawNoteBlock>>,
}

#[derive(Debug, Deserialize)]
struct RawAppConfig {
    title: Option<String>,
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawNoteBlock {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<EntityId>,
    head: Option<String>,
    order: Option<i64>,
    metadata: Option<RawMetadata>,
    notes: Option<Vec<RawNote>>,
}

#[derive(Debug, Deserialize)]
struct RawNote {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<EntityId>,
    head: Option<String>,
    note: Option<String>,
    priority: Option<Priority>,
    order: Option<i64>,
    metadata: Option<RawNoteMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    created: Option<Timestamp>,
    updated: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
struct RawNoteMetadata {
    created: Option<Timestamp>,
    updated: Option<Timestamp>,
    completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAggregateDocument {
    workspaces: Vec<RawWorkspaceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkspaceEntry {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<EntityId>,
    name: Option<String>,
    created: Option<Timestamp>,
    data: Option<RawBoardPayload>,
}
