//! HTTP route handlers.

use crate::caller::Caller;
use crate::error::{GatewayError, INFO_FAILED, SEARCH_FAILED, SETTINGS_FAILED, STATS_FAILED};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use dmem_search::{
    CollectionsReport, DeclarativeMemoryPlugin, HealthReport, MemoryStats, SearchError,
    SearchQueryParams, SearchRequest, SearchResponse, Settings,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

/// Route prefix.
pub const PREFIX: &str = "/declarative-memory";

/// Shared handler state.
pub struct AppState {
    pub plugin: Arc<DeclarativeMemoryPlugin>,
}

type ApiResult<T> = std::result::Result<Json<T>, GatewayError>;

/// Build the plugin's routes.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            &format!("{}/search", PREFIX),
            get(search_get).post(search_post),
        )
        .route(&format!("{}/stats", PREFIX), get(stats))
        .route(&format!("{}/collections", PREFIX), get(collections))
        .route(&format!("{}/health", PREFIX), get(health))
        .route(
            &format!("{}/settings", PREFIX),
            get(get_settings).put(put_settings),
        )
        .with_state(state)
}

async fn search_get(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    params: Result<Query<SearchQueryParams>, QueryRejection>,
) -> ApiResult<SearchResponse> {
    let Query(params) = params.map_err(|rejection| {
        warn!(
            "Rejected search query string from {}: {}",
            caller.as_str(),
            rejection.body_text()
        );
        GatewayError::BadRequest(rejection.body_text())
    })?;

    run_search(&state, SearchRequest::from(params), &caller).await
}

async fn search_post(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<SearchResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(
            "Rejected search body from {}: {}",
            caller.as_str(),
            rejection.body_text()
        );
        GatewayError::BadRequest(rejection.body_text())
    })?;

    run_search(&state, request, &caller).await
}

async fn run_search(
    state: &AppState,
    request: SearchRequest,
    caller: &Caller,
) -> ApiResult<SearchResponse> {
    state
        .plugin
        .search(&request, caller.as_str())
        .await
        .map(Json)
        .map_err(|e| GatewayError::from_search(e, SEARCH_FAILED))
}

async fn stats(State(state): State<Arc<AppState>>, caller: Caller) -> ApiResult<MemoryStats> {
    state
        .plugin
        .service()
        .stats(caller.as_str())
        .await
        .map(Json)
        .map_err(|e| GatewayError::from_search(e, STATS_FAILED))
}

async fn collections(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Json<CollectionsReport> {
    Json(state.plugin.service().collections(caller.as_str()))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.plugin.service().health())
}

async fn get_settings(State(state): State<Arc<AppState>>, caller: Caller) -> ApiResult<Value> {
    let settings = state.plugin.settings().await.map_err(|e| {
        error!("Error loading settings for user {}: {}", caller.as_str(), e);
        GatewayError::Internal(INFO_FAILED)
    })?;

    Ok(Json(json!({
        "settings": settings,
        "schema": Settings::schema(),
    })))
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Settings> {
    let Json(value) = payload.map_err(|rejection| GatewayError::BadRequest(rejection.body_text()))?;

    match state.plugin.save_settings(value).await {
        Ok(settings) => Ok(Json(settings)),
        Err(SearchError::Settings(message)) => {
            warn!("Rejected settings from user {}: {}", caller.as_str(), message);
            Err(GatewayError::Validation(message))
        }
        Err(e) => {
            error!("Error saving settings for user {}: {}", caller.as_str(), e);
            Err(GatewayError::Internal(SETTINGS_FAILED))
        }
    }
}
