#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cacheward::router::init_router;
use cacheward::state::AppState;
use cacheward_cache::{Cache, CacheStore, MemoryStore, StoreError, StoreHandle};
use cacheward_config::CacheConfig;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Store whose every call fails as if Redis went away after startup.
#[derive(Debug, Default)]
pub struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

pub fn app_with(store: StoreHandle) -> Router {
    let cache = Cache::new(store, &CacheConfig::default());
    init_router(AppState { cache })
}

/// App backed by an in-memory store the test can inspect.
pub fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (app_with(StoreHandle::from(store.clone())), store)
}

pub async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri).await
}
