use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::pages::handlers::{self, PagesState};

/// Pages anyone can open
pub fn public_routes(state: Arc<PagesState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/tool/{id}", get(handlers::tool_detail))
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        .route("/logout", post(handlers::logout))
        .with_state(state)
}

/// Admin panel pages; the caller layers the session guard on top
pub fn admin_routes(state: Arc<PagesState>) -> Router {
    Router::new()
        .route("/admin", get(handlers::admin_panel))
        .route("/admin/tools", post(handlers::create_entry))
        .route("/admin/tools/{id}", post(handlers::update_entry))
        .route("/admin/tools/{id}/edit", get(handlers::edit_entry_page))
        .route("/admin/tools/{id}/delete", post(handlers::delete_entry))
        .route("/admin/banners", post(handlers::create_banner))
        .route("/admin/banners/{id}/delete", post(handlers::delete_banner))
        .with_state(state)
}
