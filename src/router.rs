use crate::modules::cache_admin::router::init_cache_admin_router;
use crate::modules::catalog::router::init_catalog_router;
use crate::state::AppState;
use axum::{Router, middleware};
use cacheward_observability::{logging_middleware, metrics_middleware};
use tower_http::trace::TraceLayer;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(init_catalog_router())
        .nest("/cache", init_cache_admin_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
