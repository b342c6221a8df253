use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use cacheward_cache::CacheOptions;
use tracing::instrument;

use crate::modules::catalog::model::{
    Greeting, HealthResponse, ProductList, ProductQuery, SiteStats, UncachedMessage, UserLookup,
    UserProfile,
};
use crate::modules::catalog::service::{CatalogService, MAX_PRODUCTS};
use crate::state::AppState;
use crate::utils::errors::AppError;

// Handler identities. Changing one orphans every key cached under it.
pub const ROOT_HANDLER: &str = "catalog::root";
pub const GET_USER_HANDLER: &str = "catalog::get_user";
pub const GET_PRODUCTS_HANDLER: &str = "catalog::get_products";
pub const GET_STATS_HANDLER: &str = "catalog::get_stats";

#[instrument(skip(state))]
pub async fn root(State(state): State<AppState>) -> Result<Json<Greeting>, AppError> {
    let greeting = state
        .cache
        .cached(ROOT_HANDLER, CacheOptions::new().with_expire(60), |_: ()| {
            CatalogService::greeting()
        })?
        .call(())
        .await?;

    Ok(Json(greeting))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    if user_id < 0 {
        return Err(AppError::bad_request(anyhow!("user id must not be negative")));
    }

    let profile = state
        .cache
        .cached(
            GET_USER_HANDLER,
            CacheOptions::new().with_expire(300).with_namespace("users"),
            CatalogService::load_user,
        )?
        .call(UserLookup { user_id })
        .await?;

    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>, AppError> {
    if query.limit > MAX_PRODUCTS {
        return Err(AppError::bad_request(anyhow!(
            "limit must be at most {MAX_PRODUCTS}"
        )));
    }

    let products = state
        .cache
        .cached(
            GET_PRODUCTS_HANDLER,
            CacheOptions::new()
                .with_expire(120)
                .with_namespace("products"),
            CatalogService::list_products,
        )?
        .call(query)
        .await?;

    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<SiteStats>, AppError> {
    let stats = state
        .cache
        .cached(
            GET_STATS_HANDLER,
            CacheOptions::new()
                .with_expire(180)
                .with_key("global_stats")
                .with_namespace("analytics"),
            |_: ()| CatalogService::site_stats(),
        )?
        .call(())
        .await?;

    Ok(Json(stats))
}

pub async fn no_cache() -> Json<UncachedMessage> {
    Json(UncachedMessage {
        message: "This endpoint is not cached".to_string(),
        timestamp: chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = if !state.cache.is_enabled() {
        "disabled"
    } else if state.cache.health_check().await {
        "connected"
    } else {
        "unreachable"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        cache: cache.to_string(),
    })
}
