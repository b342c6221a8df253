mod common;

use axum::http::StatusCode;
use cacheward_cache::{CacheStore, StoreHandle};
use common::{app_with, delete, get, memory_app};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_clear_namespace_leaves_other_namespaces() {
    let (app, store) = memory_app();
    get(&app, "/user/1").await;
    get(&app, "/user/2").await;
    get(&app, "/stats").await;

    let (status, body) = delete(&app, "/cache/clear?namespace=users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["deleted"], 2);

    assert!(store.scan_prefix("users:").await.unwrap().is_empty());
    assert!(store.get("analytics:global_stats").await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_clear_single_key() {
    let (app, store) = memory_app();
    get(&app, "/stats").await;
    get(&app, "/user/1").await;

    let (_, body) = delete(&app, "/cache/clear?key=global_stats&namespace=analytics").await;
    assert_eq!(body["deleted"], 1);
    assert!(store.get("analytics:global_stats").await.unwrap().is_none());
    assert_eq!(store.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_then_miss() {
    let (app, store) = memory_app();

    let (_, first) = get(&app, "/user/42").await;
    get(&app, "/products").await;

    let (_, hit) = get(&app, "/user/42").await;
    assert_eq!(hit["timestamp"], first["timestamp"]);

    tokio::time::advance(Duration::from_secs(100)).await;
    let key = store.scan_prefix("users:").await.unwrap().remove(0);
    let aged = store.ttl(&key).await.unwrap();
    assert!(aged <= Duration::from_secs(200));

    let (status, body) = delete(&app, "/cache/clear-all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);
    assert!(store.is_empty().await);

    // Timestamps come from the wall clock, which paused tokio time does not hold.
    std::thread::sleep(Duration::from_millis(5));

    let (_, recomputed) = get(&app, "/user/42").await;
    assert_eq!(recomputed["user_id"], 42);
    assert_ne!(recomputed["timestamp"], first["timestamp"]);
    assert_eq!(store.ttl(&key).await, Some(Duration::from_secs(300)));

    let (_, hit_again) = get(&app, "/user/42").await;
    assert_eq!(hit_again["timestamp"], recomputed["timestamp"]);
}

#[tokio::test(start_paused = true)]
async fn test_clear_without_arguments_clears_everything() {
    let (app, store) = memory_app();
    get(&app, "/user/3").await;
    get(&app, "/stats").await;

    let (_, body) = delete(&app, "/cache/clear").await;
    assert_eq!(body["deleted"], 2);
    assert_eq!(body["message"], "Cleared all cache entries");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_clear_without_store_reports_zero() {
    let app = app_with(StoreHandle::none());

    let (status, body) = delete(&app, "/cache/clear?namespace=users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 0);

    let (_, body) = delete(&app, "/cache/clear-all").await;
    assert_eq!(body["deleted"], 0);
}
