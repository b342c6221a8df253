use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_products, get_stats, get_user, health, no_cache, root};

pub fn init_catalog_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/user/{user_id}", get(get_user))
        .route("/products", get(get_products))
        .route("/stats", get(get_stats))
        .route("/no-cache", get(no_cache))
        .route("/health", get(health))
}
