//! Shared fixtures for the integration tests.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get as get_route, post};
use axum::{Json, Router};
use dmem_core::Capability;
use dmem_gateway::{Gateway, GatewayConfig};
use dmem_memory::{
    Capabilities, CollectionInfo, Embedder, LocalCollection, MemoryAreas, MemoryCollection,
    MemoryError, RawSearchResult,
};
use dmem_plugin_sdk::{InMemorySettingsStore, Plugin, PluginContext, Version};
use dmem_search::{DeclarativeMemoryPlugin, SearchService};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Keywords mapped to embedding axes.
const AXES: [&str; 3] = ["rust", "python", "cooking"];

/// Embeds text as a one-hot vector over the keywords it mentions.
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    fn dimension(&self) -> usize {
        AXES.len()
    }

    async fn embed(&self, texts: &[String]) -> dmem_memory::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                AXES.iter()
                    .map(|axis| if text.contains(axis) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

/// A collection whose every call fails with a backend error.
pub struct BrokenCollection;

#[async_trait]
impl MemoryCollection for BrokenCollection {
    fn info(&self) -> CollectionInfo {
        CollectionInfo {
            collection_name: "declarative".to_string(),
            embedder_name: "keyword".to_string(),
            embedder_size: AXES.len(),
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new([Capability::Search, Capability::Count])
    }

    async fn search(
        &self,
        _query: &str,
        _k: usize,
        _threshold: f64,
        _filter: Option<&dmem_memory::MetadataFilter>,
    ) -> dmem_memory::Result<Vec<RawSearchResult>> {
        Err(MemoryError::backend("connection refused to 10.0.0.7:6333"))
    }

    async fn recall_memories_from_embedding(
        &self,
        _embedding: &[f32],
        _k: usize,
        _threshold: f64,
    ) -> dmem_memory::Result<Vec<RawSearchResult>> {
        Err(MemoryError::backend("connection refused to 10.0.0.7:6333"))
    }

    async fn count(&self) -> dmem_memory::Result<usize> {
        Err(MemoryError::backend("count timed out"))
    }
}

/// A local collection holding three documents.
pub async fn seeded_collection(capabilities: Capabilities) -> LocalCollection {
    let collection = LocalCollection::new("declarative", Arc::new(KeywordEmbedder))
        .with_capabilities(capabilities);

    let docs = [
        ("Rust ownership rules", json!({"source": "book", "year": 2021})),
        ("Rust async runtimes", json!({"source": "blog", "year": 2023})),
        ("Python decorators explained", json!({"source": "book", "year": 2019})),
    ];
    for (content, metadata) in docs {
        let metadata: HashMap<String, Value> = serde_json::from_value(metadata)
            .expect("fixture metadata is an object");
        collection
            .add_text(content, metadata)
            .await
            .expect("fixture embeds");
    }

    collection
}

/// An initialized plugin over `collection`, with settings kept in memory.
pub async fn plugin_with(
    collection: Option<Arc<dyn MemoryCollection>>,
) -> (Arc<DeclarativeMemoryPlugin>, Arc<InMemorySettingsStore>) {
    let areas = match collection {
        Some(collection) => MemoryAreas::declarative(collection),
        None => MemoryAreas::default(),
    };
    let service = SearchService::new(areas, Arc::new(KeywordEmbedder));
    let store = Arc::new(InMemorySettingsStore::new());

    let ctx = PluginContext::new(Version::new(0, 1, 0), store.clone());
    let mut plugin = DeclarativeMemoryPlugin::new(Arc::new(service));
    plugin.initialize(&ctx).await.expect("plugin initializes");

    (Arc::new(plugin), store)
}

/// The gateway router for `plugin`.
pub fn router(plugin: Arc<DeclarativeMemoryPlugin>) -> Router {
    Gateway::new(GatewayConfig::default(), plugin).router()
}

/// Router over the seeded collection with every capability.
pub async fn seeded_router() -> Router {
    let collection = seeded_collection(Capabilities::all()).await;
    let (plugin, _) = plugin_with(Some(Arc::new(collection))).await;
    router(plugin)
}

/// Send one request and decode the JSON body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, body)
}

/// GET `uri`.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Send `body` as JSON with `method` to `uri`.
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// A vector-store HTTP API that rejects filtered searches with 422.
///
/// Serves `/search`, `/recall` and `/count` and records every request
/// body it receives, keyed by path.
#[derive(Clone, Default)]
pub struct VectorStoreStub {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl VectorStoreStub {
    /// Requests received so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("stub lock").clone()
    }

    fn record(&self, path: &str, body: &Value) {
        self.requests
            .lock()
            .expect("stub lock")
            .push((path.to_string(), body.clone()));
    }

    /// The stub's routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/search", post(stub_search))
            .route("/recall", post(stub_recall))
            .route("/count", get_route(stub_count))
            .with_state(self.clone())
    }
}

/// Documents the stub serves, in score order.
pub fn stub_documents() -> Vec<Value> {
    vec![
        json!({"page_content": "Rust ownership rules", "metadata": {"id": "r1", "source": "book"}}),
        json!({"page_content": "Rust async runtimes", "metadata": {"id": "r2", "source": "blog"}}),
        json!({"page_content": "Python decorators explained", "metadata": {"id": "p1", "source": "book"}}),
    ]
}

async fn stub_search(State(stub): State<VectorStoreStub>, Json(body): Json<Value>) -> Response {
    stub.record("search", &body);
    if body.get("filter").is_some() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "filter is not supported").into_response();
    }

    let results: Vec<Value> = stub_documents()
        .into_iter()
        .enumerate()
        .map(|(i, doc)| json!({"document": doc, "score": 0.9 - i as f64 * 0.1}))
        .collect();
    Json(json!({ "results": results })).into_response()
}

async fn stub_recall(State(stub): State<VectorStoreStub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("recall", &body);
    Json(json!([[stub_documents()[0], 0.8]]))
}

async fn stub_count(State(stub): State<VectorStoreStub>) -> Json<Value> {
    stub.record("count", &Value::Null);
    Json(json!({"count": 42}))
}

/// Routes that answer every request with 500.
pub fn failing_store() -> Router {
    Router::new().fallback(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "store offline") })
}

/// Serve `app` on an ephemeral loopback port and return its base URL.
pub async fn serve_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port");
    let addr = listener.local_addr().expect("bound address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server runs");
    });
    format!("http://{}", addr)
}
