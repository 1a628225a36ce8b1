use noteboard_core::{
    AppConfigPatch, BoardStore, MemoryKeyValueStore, NoteBlockInput, NoteBlockPatch, NoteInput,
    NotePatch, Priority,
};
use std::thread::sleep;
use std::time::Duration;

#[test]
fn first_load_seeds_the_sample_board() {
    let kv = MemoryKeyValueStore::new();
    let store = BoardStore::load(&kv, "w1").unwrap();

    assert_eq!(store.app_config().title, "Simple Todo App");
    assert_eq!(store.note_blocks().len(), 1);

    let block = &store.note_blocks()[0];
    assert_eq!(block.head, "Sample Note Block");
    assert_eq!(block.notes.len(), 1);

    let note = &block.notes[0];
    assert_eq!(note.head, "Sample Todo Item");
    assert_eq!(note.priority, Priority::High);
    assert_eq!(note.metadata.created, note.metadata.updated);
    assert!(!note.metadata.completed);
}

#[test]
fn creation_stamps_created_equal_to_updated() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BoardStore::load(&kv, "w1").unwrap();

    let block = store
        .create_note_block(NoteBlockInput {
            head: Some("Groceries".to_string()),
        })
        .unwrap();
    assert_eq!(block.metadata.created, block.metadata.updated);
    assert_eq!(block.order, 1, "appended after the seed block");

    let note = store
        .create_note(&block.id, NoteInput::default())
        .unwrap()
        .unwrap();
    assert_eq!(note.head, "New Todo Item");
    assert_eq!(note.note, "");
    assert_eq!(note.priority, Priority::Medium);
    assert_eq!(note.metadata.created, note.metadata.updated);
}

#[test]
fn update_bumps_updated_and_preserves_created() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BoardStore::load(&kv, "w1").unwrap();
    let block = store
        .create_note_block(NoteBlockInput::default())
        .unwrap();
    let note = store
        .create_note(&block.id, NoteInput::default())
        .unwrap()
        .unwrap();

    sleep(Duration::from_millis(5));
    store
        .update_note(
            &block.id,
            &note.id,
            NotePatch {
                head: Some("Milk".to_string()),
                completed: Some(true),
                ..NotePatch::default()
            },
        )
        .unwrap();

    let stored_block = store
        .note_blocks()
        .iter()
        .find(|candidate| candidate.id == block.id)
        .unwrap();
    let stored_note = &stored_block.notes[0];
    assert_eq!(stored_note.head, "Milk");
    assert!(stored_note.metadata.completed);
    assert_eq!(stored_note.metadata.created, note.metadata.created);
    assert!(stored_note.metadata.updated > stored_note.metadata.created);
    assert!(
        stored_block.metadata.updated > block.metadata.updated,
        "note mutation re-stamps the parent block"
    );
}

#[test]
fn delete_block_removes_its_notes() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BoardStore::load(&kv, "w1").unwrap();
    let block = store
        .create_note_block(NoteBlockInput::default())
        .unwrap();
    store.create_note(&block.id, NoteInput::default()).unwrap();
    store.create_note(&block.id, NoteInput::default()).unwrap();

    store.delete_note_block(&block.id).unwrap();
    assert!(store
        .note_blocks()
        .iter()
        .all(|candidate| candidate.id != block.id));

    let reloaded = BoardStore::load(&kv, "w1").unwrap();
    assert!(reloaded
        .note_blocks()
        .iter()
        .all(|candidate| candidate.id != block.id));
}

#[test]
fn mutations_on_unknown_ids_are_noops() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BoardStore::load(&kv, "w1").unwrap();
    let before = store.note_blocks().to_vec();

    store
        .update_note_block("missing", NoteBlockPatch::order(7))
        .unwrap();
    store
        .update_note("missing", "also-missing", NotePatch::order(7))
        .unwrap();
    store.delete_note_block("missing").unwrap();
    store.delete_note("missing", "also-missing").unwrap();
    assert!(store.create_note("missing", NoteInput::default()).unwrap().is_none());

    assert_eq!(store.note_blocks(), before.as_slice());
}

#[test]
fn app_config_title_update_persists() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BoardStore::load(&kv, "w1").unwrap();
    let created = store.app_config().metadata.created;

    sleep(Duration::from_millis(5));
    store
        .update_app_config(AppConfigPatch {
            title: Some("Weekend Plan".to_string()),
        })
        .unwrap();
    assert_eq!(store.app_config().title, "Weekend Plan");
    assert_eq!(store.app_config().metadata.created, created);
    assert!(store.app_config().metadata.updated > created);

    let reloaded = BoardStore::load(&kv, "w1").unwrap();
    assert_eq!(reloaded.app_config().title, "Weekend Plan");
}

#[test]
fn board_survives_reload_from_the_same_store() {
    let kv = MemoryKeyValueStore::new();
    let block_id = {
        let mut store = BoardStore::load(&kv, "w1").unwrap();
        let block = store
            .create_note_block(NoteBlockInput {
                head: Some("Groceries".to_string()),
            })
            .unwrap();
        store
            .create_note(
                &block.id,
                NoteInput {
                    head: Some("Milk".to_string()),
                    note: Some("2 liters".to_string()),
                    priority: Some(Priority::Low),
                },
            )
            .unwrap()
            .unwrap();
        block.id
    };

    let reloaded = BoardStore::load(&kv, "w1").unwrap();
    let block = reloaded
        .note_blocks()
        .iter()
        .find(|candidate| candidate.id == block_id)
        .unwrap();
    assert_eq!(block.head, "Groceries");
    assert_eq!(block.notes[0].head, "Milk");
    assert_eq!(block.notes[0].note, "2 liters");
    assert_eq!(block.notes[0].priority, Priority::Low);
}

#[test]
fn completed_item_appears_in_the_export_document() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BoardStore::load(&kv, "w1").unwrap();
    let block = store
        .create_note_block(NoteBlockInput {
            head: Some("Groceries".to_string()),
        })
        .unwrap();
    let note = store
        .create_note(
            &block.id,
            NoteInput {
                head: Some("Milk".to_string()),
                ..NoteInput::default()
            },
        )
        .unwrap()
        .unwrap();
    store
        .update_note(
            &block.id,
            &note.id,
            NotePatch {
                completed: Some(true),
                ..NotePatch::default()
            },
        )
        .unwrap();

    let doc = serde_json::to_value(store.export_data()).unwrap();
    assert_eq!(doc["version"], "1.0");
    assert!(doc["exportDate"].is_string());
    assert_eq!(doc["appConfig"]["title"], "Simple Todo App");

    let exported_block = doc["noteBlocks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|candidate| candidate["id"] == serde_json::json!(block.id))
        .unwrap();
    assert_eq!(exported_block["head"], "Groceries");
    assert_eq!(
        exported_block["notes"][0]["metadata"]["completed"],
        serde_json::json!(true)
    );
}
