use domain::store::KeyValueStore;
use domain::vote::{VoteChoice, VoteStatus};
use infrastructure::memory_store::MemoryStore;
use infrastructure::sqlite_store::SqliteStore;
use infrastructure::vote_storage::{VoteGuard, STORAGE_KEY};
use std::sync::Arc;
use tempfile::TempDir;
use tests::UnreadableStore;

#[test]
fn vote_survives_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("store.db");

    {
        let guard = VoteGuard::new(Arc::new(SqliteStore::new(&path).unwrap()));
        guard.set_vote_status(42, VoteChoice::Agree).unwrap();
    }

    let guard = VoteGuard::new(Arc::new(SqliteStore::new(&path).unwrap()));
    assert_eq!(guard.get_vote_status(42), VoteStatus::voted(VoteChoice::Agree));
    assert_eq!(guard.get_vote_status(43), VoteStatus::not_voted());
}

#[test]
fn stored_blob_keeps_the_wire_layout() {
    let store = Arc::new(MemoryStore::new());
    let guard = VoteGuard::new(store.clone());
    guard.set_vote_status(7, VoteChoice::Disagree).unwrap();

    let raw = store.get(STORAGE_KEY).unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["7"]["choice"], "disagree");
    assert!(parsed["7"]["timestamp"].as_i64().unwrap() > 0);
}

#[test]
fn blob_written_elsewhere_is_honoured() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(
            STORAGE_KEY,
            r#"{"42":{"choice":"agree","timestamp":1700000000000}}"#,
        )
        .unwrap();
    let guard = VoteGuard::new(store);
    assert_eq!(guard.get_vote_status(42), VoteStatus::voted(VoteChoice::Agree));
}

#[test]
fn unreadable_store_fails_open() {
    let guard = VoteGuard::new(Arc::new(UnreadableStore));
    assert_eq!(guard.get_vote_status(42), VoteStatus::not_voted());
    assert!(guard.all().is_empty());
    assert!(guard.set_vote_status(42, VoteChoice::Agree).is_err());
}

#[test]
fn corrupt_blob_reads_as_empty_and_is_overwritten() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store.set(STORAGE_KEY, "not json").unwrap();
    let guard = VoteGuard::new(store);

    assert_eq!(guard.get_vote_status(1), VoteStatus::not_voted());
    guard.set_vote_status(1, VoteChoice::Disagree).unwrap();
    assert_eq!(guard.get_vote_status(1), VoteStatus::voted(VoteChoice::Disagree));
}

#[test]
fn two_guards_on_one_store_last_write_wins() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let first = VoteGuard::new(store.clone());
    let second = VoteGuard::new(store);

    first.set_vote_status(5, VoteChoice::Agree).unwrap();
    second.set_vote_status(5, VoteChoice::Disagree).unwrap();
    first.set_vote_status(6, VoteChoice::Agree).unwrap();

    assert_eq!(first.get_vote_status(5), VoteStatus::voted(VoteChoice::Disagree));
    assert_eq!(second.all().len(), 2);
}
