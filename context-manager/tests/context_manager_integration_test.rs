use analysis_cache::AnalysisCache;
use cag_core::ids::ConversationId;
use cag_core::test_support::{FakeConversationStore, FakeDocumentProcessor};
use cag_core::Document;
use context_analyzer::ContextAnalyzer;
use context_manager::{ContextManager, ContextManagerApi, MergeStrategy, UpdateOptions};
use global_memory::{FileKeyValueStore, GlobalMemory};
use memory_store::FileMemoryStore;
use semantic_service::HashedBagOfWordsEmbedder;
use std::sync::Arc;

fn build(dir: &std::path::Path) -> (ContextManager, Arc<FakeConversationStore>, Arc<FakeDocumentProcessor>) {
    let conversation_store = Arc::new(FakeConversationStore::new());
    let document_processor = Arc::new(FakeDocumentProcessor::new());
    let entity_extractor = Arc::new(entity_extractor::EntityExtractor::load(dir.join("catalogs")).unwrap());
    let semantic = Arc::new(HashedBagOfWordsEmbedder::new());
    let analyzer = Arc::new(ContextAnalyzer::new(
        entity_extractor.clone(),
        AnalysisCache::new(dir.join("cache")),
        conversation_store.clone(),
        Arc::new(FileMemoryStore::new(dir.join("memory"))),
        document_processor.clone(),
        semantic.clone(),
        dir.join("contexts"),
    ));
    let global_memory = Arc::new(GlobalMemory::new(Arc::new(FileKeyValueStore::new(dir.join("global"))), semantic, dir.join("global/feedback.jsonl")));
    let manager = ContextManager::new(
        analyzer,
        global_memory,
        entity_extractor,
        Arc::new(FileMemoryStore::new(dir.join("memory"))),
        document_processor.clone(),
        dir.join("contexts"),
        dir.join("context-history"),
    );
    (manager, conversation_store, document_processor)
}

#[tokio::test]
async fn a_full_turn_round_trips_through_process_message_and_process_response() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, _, documents) = build(dir.path());
    let conversation_id = ConversationId::new("conv-1");
    documents
        .seed(&conversation_id, vec![Document { id: "d1".into(), name: "rust-guide".into(), content: "rust es un lenguaje de sistemas seguro".into() }])
        .await;

    let context = manager.process_message(&conversation_id, Some("user-1".into()), "hablame de rust").await.unwrap();
    assert_eq!(context.owner_id.as_deref(), Some("user-1"));

    let updated = manager.process_response(&conversation_id, Some("user-1".into()), context, "hablame de rust", "rust es un lenguaje de sistemas").await.unwrap();
    assert!(updated.version_id.is_some());

    let versions = manager.get_context_versions(&conversation_id).await.unwrap();
    assert_eq!(versions.len(), 2);

    let latest = manager.get_context_version(&conversation_id, versions.first().unwrap()).await.unwrap();
    assert!(latest.is_some());
}

#[tokio::test]
async fn search_context_degrades_gracefully_when_a_collaborator_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, _, _) = build(dir.path());
    let conversation_id = ConversationId::new("conv-2");

    let result = manager.search_context(&conversation_id, "rust").await;
    assert!(result.memory.is_empty());
}

#[tokio::test]
async fn merge_contexts_is_exposed_through_the_manager_api() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, _, _) = build(dir.path());
    let conversation_id = ConversationId::new("conv-3");
    let context = manager.process_message(&conversation_id, None, "hola").await.unwrap();

    let merged = manager.merge_contexts(&context, &context, MergeStrategy::Keep).unwrap();
    assert_eq!(merged.conversation_id, context.conversation_id);
}

#[tokio::test]
async fn updating_with_strict_validation_rejects_an_empty_conversation_id() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, _, _) = build(dir.path());
    let bad = cag_types::ContextMap::minimal("hola", "", chrono::Utc::now());

    let result = manager.update_context_map(None, bad, UpdateOptions { save_history: false, strict_validation: true }).await;
    assert!(result.is_err());
}
