mod common;

use axum::http::StatusCode;
use cacheward::modules::catalog::controller::GET_USER_HANDLER;
use cacheward_cache::{CacheStore, StoreHandle};
use cacheward_core::{ArgumentSet, ExclusionSet, fingerprint};
use common::{UnreachableStore, app_with, get, memory_app};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_second_request_is_served_from_cache() {
    let (app, store) = memory_app();

    let (status, first) = get(&app, "/user/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["name"], "User_42");
    assert_eq!(first["email"], "user42@example.com");

    let (_, second) = get(&app, "/user/42").await;
    assert_eq!(first, second);
    assert_eq!(store.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_user_key_is_namespaced_fingerprint() {
    let (app, store) = memory_app();
    get(&app, "/user/42").await;

    let args = ArgumentSet::new().named("user_id", &42i64);
    let local = fingerprint(GET_USER_HANDLER, &args, &ExclusionSet::new()).unwrap();
    let key = format!("users:{local}");

    assert!(store.get(&key).await.unwrap().is_some());
    assert_eq!(store.ttl(&key).await.unwrap().as_secs(), 300);
}

#[tokio::test(start_paused = true)]
async fn test_distinct_arguments_get_distinct_entries() {
    let (app, store) = memory_app();

    let (_, user_1) = get(&app, "/user/1").await;
    let (_, user_2) = get(&app, "/user/2").await;

    assert_eq!(user_1["user_id"], 1);
    assert_eq!(user_2["user_id"], 2);
    assert_eq!(store.scan_prefix("users:").await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_product_query_defaults_share_key() {
    let (app, store) = memory_app();

    let (_, implicit) = get(&app, "/products").await;
    let (_, explicit) = get(&app, "/products?limit=10&category=all").await;
    assert_eq!(implicit, explicit);
    assert_eq!(implicit["products"].as_array().unwrap().len(), 10);

    get(&app, "/products?category=books&limit=3").await;
    assert_eq!(store.scan_prefix("products:").await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stats_use_static_key() {
    let (app, store) = memory_app();

    let (status, _) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.get("analytics:global_stats").await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_root_uses_default_namespace() {
    let (app, store) = memory_app();

    let (_, body) = get(&app, "/").await;
    assert_eq!(body["message"], "Hello World");

    let keys = store.scan_prefix("main:").await.unwrap();
    assert_eq!(keys.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_cache_endpoint_writes_nothing() {
    let (app, store) = memory_app();

    let (status, _) = get(&app, "/no-cache").await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_store_fails_open() {
    let app = app_with(StoreHandle::from(Arc::new(UnreachableStore)));

    let (status, body) = get(&app, "/user/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "User_7");

    let (status, _) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_without_store_every_request_runs_handler() {
    let app = app_with(StoreHandle::none());

    let (_, first) = get(&app, "/user/5").await;
    let (_, second) = get(&app, "/user/5").await;
    assert_eq!(first["name"], second["name"]);

    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["cache"], "disabled");
}

#[tokio::test]
async fn test_health_reports_connected_store() {
    let (app, _) = memory_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"], "connected");
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected_before_caching() {
    let (app, store) = memory_app();

    let (status, _) = get(&app, "/user/-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/products?limit=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.is_empty().await);
}
