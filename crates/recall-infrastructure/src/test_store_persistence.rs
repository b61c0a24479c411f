//! End-to-end tests: store mutations surviving a simulated restart.

use crate::json_snapshot_repository::JsonSnapshotRepository;
use crate::storage::SnapshotStorage;
use recall_core::{ChatMessage, NullLocaleNotifier, QueryMode, QuerySettingsUpdate, StateStore, Theme};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn open_store(dir: &Path) -> StateStore {
    let repository =
        JsonSnapshotRepository::new(SnapshotStorage::new(dir.join("snapshot.json")));
    StateStore::new(Arc::new(repository), Arc::new(NullLocaleNotifier))
}

#[test]
fn test_state_survives_restart() {
    let dir = TempDir::new().unwrap();

    let conversation_id = {
        let mut store = open_store(dir.path());
        store.set_theme(Theme::Dark);
        store.set_graph_max_nodes(2000);
        store.update_query_settings(QuerySettingsUpdate {
            mode: Some(QueryMode::Hybrid),
            stream: Some(false),
            ..Default::default()
        });
        let id = store.create_conversation();
        store.set_history(vec![
            ChatMessage::user("what changed?"),
            ChatMessage::assistant("everything is persisted"),
        ]);
        id
    };

    let store = open_store(dir.path());
    assert_eq!(store.settings().app.theme, Theme::Dark);
    assert_eq!(store.settings().graph.max_nodes, 2000);
    assert_eq!(store.query_settings().mode, QueryMode::Hybrid);
    assert!(!store.query_settings().stream);
    assert_eq!(store.active_conversation_id(), conversation_id);
    assert_eq!(store.active_history().len(), 2);
    assert_eq!(store.active_history()[1].content, "everything is persisted");
}

#[test]
fn test_restart_after_delete_keeps_registry_non_empty() {
    let dir = TempDir::new().unwrap();

    {
        let mut store = open_store(dir.path());
        let sole = store.active_conversation_id().to_string();
        store.delete_conversation(&sole);
    }

    let store = open_store(dir.path());
    assert_eq!(store.conversations().len(), 1);
    assert!(store
        .conversations()
        .contains_key(store.active_conversation_id()));
    assert!(store.active_history().is_empty());
}

#[test]
fn test_legacy_file_hydrates_through_migration() {
    let dir = TempDir::new().unwrap();
    let legacy = serde_json::json!({
        "version": 6,
        "settings": {"app": {"language": "fr", "apiBase": "http://localhost:9621"}},
        "retrievalHistory": [{"role": "user", "content": "bonjour"}]
    });
    std::fs::write(
        dir.path().join("snapshot.json"),
        serde_json::to_string(&legacy).unwrap(),
    )
    .unwrap();

    let store = open_store(dir.path());
    assert_eq!(store.settings().app.language, "fr");
    assert_eq!(store.active_history().len(), 1);
    assert_eq!(store.active_history()[0].content, "bonjour");
    assert!(store
        .active_conversation_id()
        .starts_with("conv-"));
}
