//! Concurrent blob reads with per-id fault isolation.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::MockStorage;
use goldfish::domain::blob::NOT_CERTIFIED_MESSAGE;
use goldfish::BlobContentResolver;

#[tokio::test]
async fn one_failure_does_not_affect_the_others() {
    let storage = Arc::new(MockStorage::new());
    storage.store("ok-1", b"first");
    storage.store("bad", b"never returned");
    storage.fail_reads_of("bad");
    storage.store("ok-2", &[0xFF, 0xD8, 0x00]);
    let resolver = BlobContentResolver::new(storage.clone());

    let ids: Vec<String> = ["ok-1", "bad", "pending", "ok-2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let results = resolver.resolve_all(&ids).await;

    let order: Vec<&str> = results.iter().map(|r| r.blob_id.as_str()).collect();
    assert_eq!(order, vec!["ok-1", "bad", "pending", "ok-2"]);

    assert_eq!(results[0].data.as_deref(), Some(&b"first"[..]));
    assert!(results[0].error.is_none());

    assert!(results[1].data.is_none());
    assert!(results[1].error.as_deref().unwrap().contains("sliver missing"));
    assert!(!results[1].not_certified);

    assert!(results[2].data.is_none());
    assert_eq!(results[2].error.as_deref(), Some(NOT_CERTIFIED_MESSAGE));
    assert!(results[2].not_certified);

    assert_eq!(results[3].data.as_deref(), Some(&[0xFF, 0xD8, 0x00][..]));
    assert_eq!(storage.read_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn every_result_is_either_data_or_error() {
    let storage = Arc::new(MockStorage::new());
    storage.store("a", b"x");
    storage.fail_reads_of("b");
    let resolver = BlobContentResolver::new(storage);

    let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    for result in resolver.resolve_all(&ids).await {
        assert!(result.data.is_some() ^ result.error.is_some());
    }
}

#[tokio::test]
async fn empty_input_resolves_to_nothing() {
    let resolver = BlobContentResolver::new(Arc::new(MockStorage::new()));
    assert!(resolver.resolve_all(&[]).await.is_empty());
}
