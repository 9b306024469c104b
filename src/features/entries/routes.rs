use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::entries::handlers;
use crate::features::entries::services::EntryService;

/// Public entry routes
pub fn routes(service: Arc<EntryService>) -> Router {
    Router::new()
        .route("/api/entries/{id}", get(handlers::get_entry))
        .with_state(service)
}
