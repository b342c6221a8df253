use axum::{Router, routing::delete};

use crate::state::AppState;

use super::controller::{clear_all, clear_cache};

pub fn init_cache_admin_router() -> Router<AppState> {
    Router::new()
        .route("/clear", delete(clear_cache))
        .route("/clear-all", delete(clear_all))
}
