use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::banners::handlers;
use crate::features::banners::services::BannerService;

/// Public banner routes
pub fn routes(service: Arc<BannerService>) -> Router {
    Router::new()
        .route("/api/banners", get(handlers::list_banners))
        .with_state(service)
}
