use noteboard_core::{
    workspace_data_key, BoardStore, KeyValueStore, MemoryKeyValueStore, WorkspaceManager,
    WorkspacePatch,
};
use std::thread::sleep;
use std::time::Duration;

#[test]
fn first_load_seeds_one_active_workspace() {
    let kv = MemoryKeyValueStore::new();
    let manager = WorkspaceManager::load(&kv).unwrap();

    assert_eq!(manager.workspaces().len(), 1);
    assert_eq!(manager.workspaces()[0].name, "My Workspace");
    assert_eq!(manager.active_id(), manager.workspaces()[0].id);
}

#[test]
fn create_workspace_activates_it_and_defaults_blank_names() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();

    let team_id = manager.create_workspace("Team").unwrap();
    assert_eq!(manager.active_id(), team_id);
    assert_eq!(manager.get(&team_id).unwrap().name, "Team");

    let blank_id = manager.create_workspace("   ").unwrap();
    assert_eq!(manager.get(&blank_id).unwrap().name, "New Workspace");
    assert_eq!(manager.active_id(), blank_id);
    assert_eq!(manager.workspaces().len(), 3);
}

#[test]
fn deleting_the_last_workspace_is_rejected() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();
    let only_id = manager.active_id().to_string();

    assert!(!manager.delete_workspace(&only_id).unwrap());
    assert_eq!(manager.workspaces().len(), 1);
    assert_eq!(manager.active_id(), only_id);
}

#[test]
fn deleting_the_active_workspace_promotes_the_first_remaining() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();
    let first_id = manager.active_id().to_string();
    let second_id = manager.create_workspace("Second").unwrap();

    assert!(manager.delete_workspace(&second_id).unwrap());
    assert_eq!(manager.active_id(), first_id);
    assert!(manager.get(&second_id).is_none());
}

#[test]
fn deleting_a_workspace_removes_its_board_data() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();
    let doomed_id = manager.create_workspace("Doomed").unwrap();

    // Opening the board persists it under the workspace data key.
    BoardStore::load(&kv, doomed_id.clone()).unwrap();
    assert!(kv.get_raw(&workspace_data_key(&doomed_id)).unwrap().is_some());

    assert!(manager.delete_workspace(&doomed_id).unwrap());
    assert!(kv.get_raw(&workspace_data_key(&doomed_id)).unwrap().is_none());
}

#[test]
fn unknown_workspace_deletion_returns_false() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();
    manager.create_workspace("Second").unwrap();

    assert!(!manager.delete_workspace("missing").unwrap());
    assert_eq!(manager.workspaces().len(), 2);
}

#[test]
fn switch_persists_across_reload_and_ignores_unknown_ids() {
    let kv = MemoryKeyValueStore::new();
    let first_id;
    {
        let mut manager = WorkspaceManager::load(&kv).unwrap();
        first_id = manager.workspaces()[0].id.clone();
        manager.create_workspace("Second").unwrap();
        manager.switch_workspace(&first_id).unwrap();
        manager.switch_workspace("missing").unwrap();
        assert_eq!(manager.active_id(), first_id);
    }

    let reloaded = WorkspaceManager::load(&kv).unwrap();
    assert_eq!(reloaded.active_id(), first_id);
}

#[test]
fn rename_bumps_last_modified_only() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();
    let id = manager.active_id().to_string();
    let created = manager.get(&id).unwrap().created;
    let modified = manager.get(&id).unwrap().last_modified;

    sleep(Duration::from_millis(5));
    manager
        .update_workspace(
            &id,
            WorkspacePatch {
                name: Some("Renamed".to_string()),
            },
        )
        .unwrap();

    let workspace = manager.get(&id).unwrap();
    assert_eq!(workspace.name, "Renamed");
    assert_eq!(workspace.created, created);
    assert!(workspace.last_modified > modified);
}

#[test]
fn touch_stamps_last_modified_after_descendant_mutations() {
    let kv = MemoryKeyValueStore::new();
    let mut manager = WorkspaceManager::load(&kv).unwrap();
    let id = manager.active_id().to_string();
    let before = manager.get(&id).unwrap().last_modified;

    sleep(Duration::from_millis(5));
    manager.touch(&id).unwrap();
    assert!(manager.get(&id).unwrap().last_modified > before);

    // Unknown ids are a no-op.
    manager.touch("missing").unwrap();
}

#[test]
fn corrupt_registry_is_repaired_on_load() {
    let kv = MemoryKeyValueStore::new();
    kv.set_raw("workspaces", "not json at all").unwrap();

    let manager = WorkspaceManager::load(&kv).unwrap();
    assert_eq!(manager.workspaces().len(), 1);
    assert_eq!(manager.active_id(), manager.workspaces()[0].id);
}

#[test]
fn stale_active_id_falls_back_to_the_first_workspace() {
    let kv = MemoryKeyValueStore::new();
    let first_id;
    {
        let mut manager = WorkspaceManager::load(&kv).unwrap();
        first_id = manager.workspaces()[0].id.clone();
        manager.create_workspace("Second").unwrap();
    }
    // Corrupt only the active pointer, keeping the list intact.
    let raw = kv.get_raw("workspaces").unwrap().unwrap();
    let mut registry: serde_json::Value = serde_json::from_str(&raw).unwrap();
    registry["active"] = serde_json::json!("gone");
    kv.set_raw("workspaces", &registry.to_string()).unwrap();

    let manager = WorkspaceManager::load(&kv).unwrap();
    assert_eq!(manager.active_id(), first_id);
}
