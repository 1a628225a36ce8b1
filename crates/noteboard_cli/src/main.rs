//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `noteboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use noteboard_core::{open_db_in_memory, BoardStore, SqliteKeyValueStore, WorkspaceManager};

fn main() {
    println!("noteboard_core version={}", noteboard_core::core_version());

    if let Err(err) = run() {
        eprintln!("smoke check failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let kv = SqliteKeyValueStore::try_new(&conn)?;

    let manager = WorkspaceManager::load(&kv)?;
    let active = manager.active_id().to_string();
    println!("workspaces={}", manager.workspaces().len());
    println!("active_workspace={active}");

    let store = BoardStore::load(&kv, active)?;
    println!("board_title={}", store.app_config().title);
    println!("note_blocks={}", store.note_blocks().len());
    Ok(())
}
