use serde_json::json;
use transcoope_core::store::{KvBackend, NamespacedStore, SqliteKvStore, StoreError, StoreKey};
use transcoope_core::MemoryKvStore;

#[test]
fn sqlite_backend_round_trips_json_values() {
    let store = NamespacedStore::new(SqliteKvStore::open_in_memory().unwrap(), "transcoope_");
    let value = json!({ "username": "Musician", "stats": { "transcriptions": 0 } });

    assert!(store.is_available());
    assert!(store.set(StoreKey::UserData, &value));
    assert_eq!(store.get(StoreKey::UserData), Some(value));

    let raw = store
        .backend()
        .get_item("transcoope_userData")
        .unwrap()
        .expect("entry stored under the namespaced key");
    assert!(raw.contains("Musician"));
}

#[test]
fn sqlite_backend_overwrites_and_removes() {
    let store = NamespacedStore::new(SqliteKvStore::open_in_memory().unwrap(), "transcoope_");
    assert!(store.set("theme", &json!("dark")));
    assert!(store.set("theme", &json!("light")));
    assert_eq!(store.get("theme"), Some(json!("light")));

    assert!(store.remove("theme"));
    assert_eq!(store.get("theme"), None);
}

#[test]
fn corrupt_entry_reads_as_absent() {
    let backend = MemoryKvStore::new();
    backend.set_item("transcoope_notifications", "[{").unwrap();
    let store = NamespacedStore::new(backend, "transcoope_");

    assert_eq!(store.get(StoreKey::Notifications), None);
}

#[test]
fn namespaces_do_not_collide() {
    let backend = MemoryKvStore::new();
    let shell = NamespacedStore::new(backend.clone(), "transcoope_");
    let other = NamespacedStore::new(backend.clone(), "other_");

    assert!(shell.set(StoreKey::CurrentUser, &json!({ "id": "temp_a" })));
    assert_eq!(other.get(StoreKey::CurrentUser), None);
    assert_eq!(backend.len(), 1);
}

#[test]
fn quota_overflow_degrades_to_false() {
    let store = NamespacedStore::new(MemoryKvStore::with_quota(32), "transcoope_");

    assert!(!store.set(StoreKey::UserData, &json!({ "username": "x".repeat(64) })));
    assert_eq!(store.get(StoreKey::UserData), None);
}

#[test]
fn sqlite_write_failure_names_the_operation() {
    let backend = SqliteKvStore::open_in_memory().unwrap();
    backend
        .connection()
        .execute_batch(
            "CREATE TRIGGER kv_entries_frozen BEFORE INSERT ON kv_entries
             BEGIN SELECT RAISE(ABORT, 'frozen'); END;",
        )
        .unwrap();

    let err = backend.set_item("transcoope_userData", "{}").unwrap_err();
    assert!(matches!(err, StoreError::Sqlite { op: "set_item", .. }));
    assert!(err.to_string().starts_with("sqlite set_item failed"));
    assert_eq!(backend.get_item("transcoope_userData").unwrap(), None);
}

#[test]
fn read_only_memory_backend_keeps_reads() {
    let backend = MemoryKvStore::new();
    let store = NamespacedStore::new(backend.clone(), "transcoope_");
    assert!(store.set(StoreKey::UserData, &json!({ "username": "ana" })));

    backend.set_read_only(true);
    assert!(!store.set(StoreKey::UserData, &json!({ "username": "bo" })));
    assert!(!store.remove(StoreKey::UserData));
    assert_eq!(store.get(StoreKey::UserData), Some(json!({ "username": "ana" })));

    backend.set_read_only(false);
    assert!(store.set(StoreKey::UserData, &json!({ "username": "bo" })));
}
