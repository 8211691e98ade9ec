//! HTTP endpoint integration tests.
//!
//! These drive the full router (routes, extractors, error mapping and
//! layers) with in-process requests against local collections.

use axum::http::{Request, StatusCode};
use dmem_core::Capability;
use dmem_integration_tests::{
    get, json_request, plugin_with, router, seeded_collection, seeded_router, send,
    BrokenCollection,
};
use dmem_memory::Capabilities;
use serde_json::{json, Value};
use std::sync::Arc;

fn contents(body: &Value) -> Vec<String> {
    let mut contents: Vec<String> = body["results"]
        .as_array()
        .expect("results array")
        .iter()
        .map(|r| r["content"].as_str().expect("content").to_string())
        .collect();
    contents.sort();
    contents
}

#[tokio::test]
async fn test_get_search_uses_defaults() {
    let (status, body) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=rust"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "rust");
    assert_eq!(body["search_method"], "search");
    assert_eq!(body["total_results"], 2);
    assert_eq!(
        contents(&body),
        vec!["Rust async runtimes", "Rust ownership rules"]
    );
    assert_eq!(body["parameters"]["k"], 5);
    assert_eq!(body["parameters"]["threshold"], 0.7);
    assert_eq!(body["parameters"]["metadata_filter"], Value::Null);
    assert_eq!(body["embedder_info"]["name"], "keyword");
    assert_eq!(body["embedder_info"]["size"], 3);
    assert!(body["search_time_ms"].as_f64().unwrap() >= 0.0);

    let first = &body["results"][0];
    assert_eq!(first["score"], 1.0);
    assert_eq!(first["content_preview"], first["content"]);
    assert!(first["metadata"]["source"].is_string());
    assert_eq!(first["document_id"], first["metadata"]["id"]);
}

#[tokio::test]
async fn test_get_search_flags_strip_scores_and_metadata() {
    let (status, body) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=python&include_scores=false&include_metadata=false"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 1);
    let result = &body["results"][0];
    assert_eq!(result["content"], "Python decorators explained");
    assert_eq!(result["score"], Value::Null);
    assert_eq!(result["metadata"], Value::Null);
    assert_eq!(result["document_id"], Value::Null);
}

#[tokio::test]
async fn test_get_search_flags_accept_other_spellings() {
    let (status, body) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=python&include_scores=False&include_metadata=0"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parameters"]["include_scores"], false);
    assert_eq!(body["parameters"]["include_metadata"], false);
    let result = &body["results"][0];
    assert_eq!(result["score"], Value::Null);
    assert_eq!(result["metadata"], Value::Null);

    let (status, body) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=python&include_scores=YES&include_metadata=on"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["score"], 1.0);
    assert!(body["results"][0]["metadata"]["source"].is_string());

    let (status, _) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=python&include_scores=maybe"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_search_with_native_filter() {
    let request = json_request(
        "POST",
        "/declarative-memory/search",
        &json!({"query": "rust", "metadata_filter": {"source": "book"}}),
    );
    let (status, body) = send(seeded_router().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_method"], "search_with_filter");
    assert_eq!(contents(&body), vec!["Rust ownership rules"]);
    assert_eq!(body["parameters"]["metadata_filter"], json!({"source": "book"}));
}

#[tokio::test]
async fn test_post_search_filters_after_plain_search() {
    let collection = seeded_collection(Capabilities::new([Capability::Search])).await;
    let (plugin, _) = plugin_with(Some(Arc::new(collection))).await;

    let request = json_request(
        "POST",
        "/declarative-memory/search",
        &json!({"query": "rust", "metadata_filter": {"source": "blog"}}),
    );
    let (status, body) = send(router(plugin), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_method"], "search");
    assert_eq!(contents(&body), vec!["Rust async runtimes"]);
    assert_eq!(body["total_results"], 1);
}

#[tokio::test]
async fn test_recall_only_collection() {
    let collection = seeded_collection(Capabilities::none()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(collection))).await;

    let request = json_request(
        "POST",
        "/declarative-memory/search",
        &json!({"query": "rust", "k": 1, "threshold": 0.5}),
    );
    let (status, body) = send(router(plugin), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_method"], "recall_memories_from_embedding");
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["embedder_info"]["embedding_dimensions"], 3);
}

#[tokio::test]
async fn test_k_above_max_is_rejected() {
    let (status, body) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=rust&k=30"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "validation_error");
    assert_eq!(
        body["message"],
        "Requested number of results (30) exceeds maximum allowed (20)"
    );
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let request = json_request("POST", "/declarative-memory/search", &json!({"query": ""}));
    let (status, body) = send(seeded_router().await, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "validation_error");
}

#[tokio::test]
async fn test_malformed_input_is_a_bad_request() {
    let (status, body) = send(seeded_router().await, get("/declarative-memory/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "validation_error");

    let (status, _) = send(
        seeded_router().await,
        get("/declarative-memory/search?query=rust&k=many"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/declarative-memory/search")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"query\": "))
        .unwrap();
    let (status, body) = send(seeded_router().await, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "validation_error");
}

#[tokio::test]
async fn test_backend_failure_is_generic() {
    let (plugin, _) = plugin_with(Some(Arc::new(BrokenCollection))).await;
    let (status, body) = send(
        router(plugin),
        get("/declarative-memory/search?query=rust"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error_code": "internal_error", "message": "Error during search"})
    );
}

#[tokio::test]
async fn test_stats_counts_documents() {
    let request = Request::builder()
        .uri("/declarative-memory/stats")
        .header("x-user-id", "alice")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(seeded_router().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["memory_type"], "declarative");
    assert_eq!(body["total_documents"], 3);
    assert_eq!(body["collection_name"], "declarative");
    assert_eq!(body["embedder_info"], json!({"name": "keyword", "size": 3}));
    assert!(body["timestamp"].is_f64());
    assert!(body.get("count_error").is_none());
    assert_eq!(
        body["available_methods"],
        json!([
            "search_with_filter",
            "search",
            "query",
            "similarity_search",
            "recall_memories_from_embedding"
        ])
    );
}

#[tokio::test]
async fn test_stats_reports_count_failure() {
    let (plugin, _) = plugin_with(Some(Arc::new(BrokenCollection))).await;
    let (status, body) = send(router(plugin), get("/declarative-memory/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "user");
    assert_eq!(body["total_documents"], "error_counting");
    assert_eq!(body["count_error"], "Backend error: count timed out");
}

#[tokio::test]
async fn test_stats_without_collection() {
    let (plugin, _) = plugin_with(None).await;
    let (status, body) = send(router(plugin), get("/declarative-memory/stats")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error retrieving statistics");
}

#[tokio::test]
async fn test_collections_report() {
    let (status, body) = send(seeded_router().await, get("/declarative-memory/collections")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "user");
    assert_eq!(
        body["collections"]["declarative"],
        json!({
            "name": "declarative",
            "embedder_name": "keyword",
            "embedder_size": 3,
            "description": "Long term factual memory"
        })
    );
    assert_eq!(
        body["collections"]["episodic"],
        json!({"error": "No collection configured for episodic memory"})
    );
    assert!(body["collections"]["procedural"]["error"].is_string());
}

#[tokio::test]
async fn test_health_needs_no_collection() {
    let (plugin, _) = plugin_with(None).await;
    let (status, body) = send(router(plugin), get("/declarative-memory/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "declarative-memory-api");
    assert!(body["version"].is_string());
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.parse::<f64>().unwrap() > 0.0);
}

#[tokio::test]
async fn test_settings_round_trip_and_effect() {
    let collection = seeded_collection(Capabilities::all()).await;
    let (plugin, store) = plugin_with(Some(Arc::new(collection))).await;
    let app = router(plugin);

    let (status, body) = send(app.clone(), get("/declarative-memory/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["max_k"], 20);
    assert!(body["schema"]["properties"]["preview_length"].is_object());

    let request = json_request(
        "PUT",
        "/declarative-memory/settings",
        &json!({"max_k": 3, "preview_length": 50}),
    );
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_k"], 3);
    assert_eq!(body["default_k"], 5);

    use dmem_plugin_sdk::SettingsStore;
    assert_eq!(
        store.load(dmem_search::PLUGIN_NAME).await.unwrap()["max_k"],
        3
    );

    let (status, body) = send(
        app.clone(),
        get("/declarative-memory/search?query=rust&k=4"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "Requested number of results (4) exceeds maximum allowed (3)"
    );
}

#[tokio::test]
async fn test_settings_rejects_out_of_range() {
    let (plugin, store) = plugin_with(None).await;
    let app = router(plugin);

    let request = json_request("PUT", "/declarative-memory/settings", &json!({"max_k": 0}));
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("max_k"));

    use dmem_plugin_sdk::SettingsStore;
    assert_eq!(
        store.load(dmem_search::PLUGIN_NAME).await.unwrap(),
        json!({})
    );
}

#[tokio::test]
async fn test_disabling_search_method_forces_recall() {
    let collection = seeded_collection(Capabilities::all()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(collection))).await;
    let app = router(plugin);

    let request = json_request(
        "PUT",
        "/declarative-memory/settings",
        &json!({"use_search_method": false}),
    );
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/declarative-memory/search?query=cooking")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_method"], "recall_memories_from_embedding");
    assert_eq!(body["total_results"], 0);
}

#[tokio::test]
async fn test_cors_preflight_allows_loopback_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/declarative-memory/search")
        .header("origin", "http://localhost")
        .header("access-control-request-method", "POST")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(seeded_router().await, request)
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost")
    );
}
