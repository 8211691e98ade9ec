//! Remote collection tests against a stub vector-store server.

use axum::http::StatusCode;
use dmem_core::Capability;
use dmem_integration_tests::{
    failing_store, get, json_request, plugin_with, router, send, serve_stub, KeywordEmbedder,
    VectorStoreStub,
};
use dmem_memory::{
    Capabilities, MemoryCollection, MemoryError, MetadataFilter, RawSearchResult,
    RemoteCollection,
};
use serde_json::json;
use std::sync::Arc;

fn remote(base_url: &str, capabilities: Capabilities) -> RemoteCollection {
    RemoteCollection::new(
        "declarative",
        base_url,
        Arc::new(KeywordEmbedder),
        capabilities,
    )
}

fn filtered_and_plain() -> Capabilities {
    Capabilities::new([Capability::FilteredSearch, Capability::Search, Capability::Count])
}

#[tokio::test]
async fn test_rejected_filter_falls_back_to_plain_search() {
    let stub = VectorStoreStub::default();
    let base_url = serve_stub(stub.router()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(remote(&base_url, filtered_and_plain())))).await;

    let request = json_request(
        "POST",
        "/declarative-memory/search",
        &json!({"query": "rust", "metadata_filter": {"source": "book"}}),
    );
    let (status, body) = send(router(plugin), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_method"], "search");
    assert_eq!(body["total_results"], 2);
    assert_eq!(body["results"][0]["content"], "Rust ownership rules");
    assert_eq!(body["results"][0]["document_id"], "r1");
    assert_eq!(body["results"][1]["content"], "Python decorators explained");

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "search");
    assert_eq!(requests[0].1["filter"], json!({"source": "book"}));
    assert_eq!(requests[1].0, "search");
    assert!(requests[1].1.get("filter").is_none());
    assert_eq!(requests[1].1["k"], 5);
}

#[tokio::test]
async fn test_server_error_fails_search() {
    let base_url = serve_stub(failing_store()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(remote(&base_url, filtered_and_plain())))).await;

    let (status, body) = send(
        router(plugin),
        get("/declarative-memory/search?query=rust"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_code"], "internal_error");
    assert_eq!(body["message"], "Error during search");
}

#[tokio::test]
async fn test_count_reaches_stats() {
    let stub = VectorStoreStub::default();
    let base_url = serve_stub(stub.router()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(remote(&base_url, filtered_and_plain())))).await;

    let (status, body) = send(router(plugin), get("/declarative-memory/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_documents"], 42);
    assert_eq!(body["collection_name"], "declarative");
    assert_eq!(stub.requests()[0].0, "count");
}

#[tokio::test]
async fn test_count_failure_is_a_backend_error() {
    let base_url = serve_stub(failing_store()).await;
    let collection = remote(&base_url, filtered_and_plain());

    let err = collection.count().await.unwrap_err();
    assert!(matches!(err, MemoryError::Backend(_)));
    assert!(err.to_string().contains("store offline"));
}

#[tokio::test]
async fn test_wire_statuses_map_to_collection_errors() {
    let stub = VectorStoreStub::default();
    let base_url = serve_stub(stub.router()).await;
    let collection = remote(&base_url, filtered_and_plain());
    let filter = MetadataFilter::new().with("source", "book");

    assert!(matches!(
        collection.search("rust", 3, 0.5, Some(&filter)).await,
        Err(MemoryError::InvalidArguments(_))
    ));

    let results = collection.search("rust", 3, 0.5, None).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], RawSearchResult::Hit { .. }));
    assert_eq!(results[0].document().content(), "Rust ownership rules");

    let failing = remote(&serve_stub(failing_store()).await, filtered_and_plain());
    assert!(matches!(
        failing.search("rust", 3, 0.5, None).await,
        Err(MemoryError::Backend(_))
    ));
}

#[tokio::test]
async fn test_recall_decodes_pairs() {
    let stub = VectorStoreStub::default();
    let base_url = serve_stub(stub.router()).await;
    let collection = remote(&base_url, Capabilities::none());

    let results = collection
        .recall_memories_from_embedding(&[1.0, 0.0, 0.0], 2, 0.7)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], RawSearchResult::Pair { .. }));
    assert_eq!(results[0].score(), Some(&json!(0.8)));

    let requests = stub.requests();
    assert_eq!(requests[0].0, "recall");
    assert_eq!(requests[0].1["embedding"], json!([1.0, 0.0, 0.0]));
    assert_eq!(requests[0].1["k"], 2);
}

#[tokio::test]
async fn test_recall_only_remote_search() {
    let stub = VectorStoreStub::default();
    let base_url = serve_stub(stub.router()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(remote(&base_url, Capabilities::none())))).await;

    let (status, body) = send(
        router(plugin),
        get("/declarative-memory/search?query=rust"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_method"], "recall_memories_from_embedding");
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["results"][0]["score"], 0.8);
}
