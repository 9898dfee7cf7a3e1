use metrics::{FileMetrics, MetricsApi};

#[tokio::test]
async fn events_persist_across_separate_handles_to_the_same_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("events.jsonl");

    let writer = FileMetrics::new(&log_path);
    writer.record_event("entity_lookup", serde_json::json!({"entity_type": "person"}), Some(true)).await.unwrap();
    drop(writer);

    let reader = FileMetrics::new(&log_path);
    let stats = reader.get_entity_usage_stats().await.unwrap();
    assert_eq!(stats["person"].total_uses, 1);
}

#[tokio::test]
async fn pruning_an_empty_log_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = FileMetrics::new(dir.path().join("events.jsonl"));
    let removed = metrics.prune(30).await.unwrap();
    assert_eq!(removed, 0);
}
