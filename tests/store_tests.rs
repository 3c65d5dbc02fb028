// RecordStore tests: open, append, all, close, reopen idempotence

mod common;

use common::fixed_sample;
use sysrec::store::RecordStore;
use tempfile::TempDir;

#[tokio::test]
async fn store_open_creates_schema_and_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_data.db");
    let store = RecordStore::open(path.to_str().unwrap()).await.unwrap();
    assert!(store.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_append_then_all_round_trips_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_data.db");
    let store = RecordStore::open(path.to_str().unwrap()).await.unwrap();

    let sample = fixed_sample();
    let id = store.append(&sample).await.unwrap();

    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].sample, sample);
}

#[tokio::test]
async fn store_ids_strictly_increase_in_insertion_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_data.db");
    let store = RecordStore::open(path.to_str().unwrap()).await.unwrap();

    let mut sample = fixed_sample();
    let mut last_id = 0i64;
    for i in 0..5 {
        sample.cpu_percent = i as f64;
        let id = store.append(&sample).await.unwrap();
        assert!(id > last_id, "id {} not greater than {}", id, last_id);
        last_id = id;
    }

    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 5);
    // Oldest first, ids strictly increasing
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(all[0].sample.cpu_percent, 0.0);
    assert_eq!(all[4].sample.cpu_percent, 4.0);
    assert_eq!(all[4].id, last_id);
}

#[tokio::test]
async fn store_reopen_keeps_rows_and_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_data.db");
    let path_str = path.to_str().unwrap();

    let store = RecordStore::open(path_str).await.unwrap();
    let first_id = store.append(&fixed_sample()).await.unwrap();
    store.append(&fixed_sample()).await.unwrap();
    store.close().await;

    let reopened = RecordStore::open(path_str).await.unwrap();
    let all = reopened.all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first_id);

    // Ids keep increasing across reopen
    let next_id = reopened.append(&fixed_sample()).await.unwrap();
    assert!(next_id > all[1].id);
}

#[tokio::test]
async fn store_open_twice_on_same_path_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_data.db");
    let path_str = path.to_str().unwrap();

    let first = RecordStore::open(path_str).await.unwrap();
    first.append(&fixed_sample()).await.unwrap();

    // Second open while the first is still live: schema untouched, rows kept
    let second = RecordStore::open(path_str).await.unwrap();
    assert_eq!(second.all().await.unwrap().len(), 1);
    assert_eq!(first.all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn store_append_and_all_fail_after_close() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_data.db");
    let store = RecordStore::open(path.to_str().unwrap()).await.unwrap();

    store.append(&fixed_sample()).await.unwrap();
    store.close().await;

    assert!(store.append(&fixed_sample()).await.is_err());
    assert!(store.all().await.is_err());
}
