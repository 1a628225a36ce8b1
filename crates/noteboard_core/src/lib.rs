//! Core data management for Noteboard.
//! This crate is the single source of truth for board and workspace invariants.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod remote;
pub mod repo;
pub mod service;
pub mod sync;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use export::{
    parse_aggregate_document, parse_board_document, AggregateExport, BoardExport, BoardImport,
    ImportError, WorkspaceExportEntry, EXPORT_VERSION,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    AppConfig, AppConfigPatch, BoardData, Metadata, Note, NoteBlock, NoteBlockInput,
    NoteBlockPatch, NoteInput, NoteMetadata, NotePatch, Priority, Timestamp,
};
pub use model::workspace::{Workspace, WorkspacePatch, WorkspaceRegistry};
pub use model::{new_entity_id, EntityId};
pub use remote::api::{RemoteApi, RemoteError, RemoteResult};
pub use remote::board::RemoteBoard;
pub use remote::manager::{RemoteStoreError, RemoteStoreResult, RemoteWorkspaceManager};
pub use repo::kv_store::{
    workspace_data_key, KeyValueStore, KvError, KvResult, MemoryKeyValueStore,
    SqliteKeyValueStore,
};
pub use service::board_store::BoardStore;
pub use service::workspace_manager::WorkspaceManager;
pub use service::{StoreError, StoreResult};
pub use sync::autosync::AutoSync;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
