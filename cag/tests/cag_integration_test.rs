use cag::cag_core::test_support::{FakeConversationStore, FakeDocumentProcessor};
use cag::cag_core::{Config, ConversationId};
use cag::Cag;
use global_memory::FeedbackKind;
use std::sync::Arc;

fn bootstrap(dir: &std::path::Path) -> Cag {
    let config = Config { data_dir: dir.to_string_lossy().to_string(), ..Config::default() };
    Cag::bootstrap(&config, Arc::new(FakeConversationStore::new()), Arc::new(FakeDocumentProcessor::new())).unwrap()
}

#[tokio::test]
async fn a_full_conversation_turn_persists_context_and_updates_global_memory() {
    let dir = tempfile::tempdir().unwrap();
    let cag = bootstrap(dir.path());
    let conversation_id = ConversationId::new("c1");

    let context = cag.context_manager.process_message(&conversation_id, Some("u1".into()), "Hola, soy Ana y trabajo en Acme Corp").await.unwrap();
    assert_eq!(context.owner_id.as_deref(), Some("u1"));

    let context = cag
        .context_manager
        .process_response(&conversation_id, Some("u1".into()), context, "Hola, soy Ana y trabajo en Acme Corp", "Mucho gusto, Ana")
        .await
        .unwrap();
    assert!(!context.recent_messages.is_empty());

    let reloaded = cag.context_manager.get_context_map(&conversation_id, Some("u1")).await.unwrap();
    assert!(reloaded.is_some());

    let stats = cag.global_memory.get_global_memory_stats().await.unwrap();
    assert_eq!(stats.total_updates, 1);

    cag.shutdown();
}

#[tokio::test]
async fn feedback_through_global_memory_is_reflected_in_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let cag = bootstrap(dir.path());
    let conversation_id = ConversationId::new("c2");

    let context = cag.context_manager.process_message(&conversation_id, None, "Acme Corp firmo un contrato").await.unwrap();
    cag.context_manager.process_response(&conversation_id, None, context, "Acme Corp firmo un contrato", "Entendido").await.unwrap();

    let applied = cag.global_memory.provide_feedback("Acme Corp", cag_types::EntityType::Organization, FeedbackKind::Confirmation).await.unwrap();
    if applied {
        let usage = cag.metrics.get_entity_usage_stats().await.unwrap();
        assert!(usage.values().any(|s| s.helpful_uses >= 1));
    }

    cag.shutdown();
}

#[tokio::test]
async fn bootstrap_creates_an_isolated_data_dir_per_call() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let cag_a = bootstrap(dir_a.path());
    let cag_b = bootstrap(dir_b.path());

    let id = ConversationId::new("shared-id");
    cag_a.context_manager.process_message(&id, None, "solo en a").await.unwrap();

    let b_context = cag_b.context_manager.get_context_map(&id, None).await.unwrap();
    assert!(b_context.is_none());

    cag_a.shutdown();
    cag_b.shutdown();
}
