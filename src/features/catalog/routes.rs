use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::catalog::handlers;
use crate::features::catalog::services::CatalogService;

/// Public catalog routes, including the live WebSocket channel
pub fn routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/catalog/categories", get(handlers::list_categories))
        .route("/api/catalog/live", get(handlers::live_catalog))
        .with_state(service)
}
