use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use crate::modules::cache_admin::model::{ClearCacheQuery, ClearCacheResponse};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn clear_cache(
    State(state): State<AppState>,
    Query(query): Query<ClearCacheQuery>,
) -> Json<ClearCacheResponse> {
    let key = query.key.as_deref().filter(|k| !k.is_empty());
    let namespace = query.namespace.as_deref().filter(|ns| !ns.is_empty());

    let deleted = state.cache.clear(key, namespace).await;

    let message = match (key, namespace) {
        (Some(key), Some(namespace)) => format!("Cleared key '{key}' in namespace '{namespace}'"),
        (Some(key), None) => format!("Cleared key '{key}'"),
        (None, Some(namespace)) => format!("Cleared namespace '{namespace}'"),
        (None, None) => "Cleared all cache entries".to_string(),
    };

    Json(ClearCacheResponse::success(message, deleted))
}

#[instrument(skip(state))]
pub async fn clear_all(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let deleted = state.cache.invalidator().clear_all().await;
    Json(ClearCacheResponse::success("Cleared all cache entries", deleted))
}
