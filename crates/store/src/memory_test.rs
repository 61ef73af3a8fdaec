use bytes::Bytes;

use super::MemoryStore;
use crate::ObjectStore;

#[tokio::test]
async fn put_stores_object() {
    let store = MemoryStore::new();

    store
        .put("events", "t_1_2.log", Bytes::from_static(b"a|b\n"))
        .await
        .unwrap();

    assert_eq!(
        store.get("events", "t_1_2.log"),
        Some(Bytes::from_static(b"a|b\n"))
    );
    assert!(store.contains("events", "t_1_2.log"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn put_replaces_existing_object() {
    let store = MemoryStore::new();

    store
        .put("events", "k.log", Bytes::from_static(b"old"))
        .await
        .unwrap();
    store
        .put("events", "k.log", Bytes::from_static(b"new"))
        .await
        .unwrap();

    assert_eq!(store.get("events", "k.log"), Some(Bytes::from_static(b"new")));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn keys_filters_by_bucket() {
    let store = MemoryStore::new();

    store
        .put("events", "a.log", Bytes::from_static(b"x"))
        .await
        .unwrap();
    store
        .put("metrics", "b.log", Bytes::from_static(b"y"))
        .await
        .unwrap();

    let mut keys = store.keys("events");
    keys.sort();
    assert_eq!(keys, vec!["a.log".to_string()]);
}

#[tokio::test]
async fn fail_next_puts_injects_failures_then_recovers() {
    let store = MemoryStore::new();
    store.fail_next_puts(2);

    let first = store.put("b", "k1", Bytes::from_static(b"1")).await;
    let second = store.put("b", "k2", Bytes::from_static(b"2")).await;
    assert!(first.is_err());
    assert!(second.is_err());
    assert!(store.is_empty());

    store.put("b", "k3", Bytes::from_static(b"3")).await.unwrap();
    assert!(store.contains("b", "k3"));
}

#[tokio::test]
async fn upload_error_names_bucket_and_key() {
    let store = MemoryStore::new();
    store.fail_next_puts(1);

    let err = store
        .put("events", "t_1_2.log", Bytes::from_static(b"x"))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("events"), "{message}");
    assert!(message.contains("t_1_2.log"), "{message}");
}
