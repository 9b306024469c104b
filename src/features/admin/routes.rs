use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require the admin role)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route(
            "/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/entries/{id}",
            get(handlers::get_entry)
                .put(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        .route(
            "/banners",
            get(handlers::list_banners).post(handlers::create_banner),
        )
        .route(
            "/banners/{id}",
            put(handlers::update_banner).delete(handlers::delete_banner),
        )
        .with_state(admin_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::banners::models::Banner;
    use crate::features::banners::services::BannerService;
    use crate::features::entries::models::Entry;
    use crate::features::entries::services::EntryService;
    use crate::modules::store::{Collection, DocumentStore, MemoryDocumentStore};
    use crate::shared::test_helpers::{with_admin_auth, with_visitor_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn app() -> Router {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let service = Arc::new(AdminService::new(
            Arc::new(EntryService::new(Collection::<Entry>::new(
                store.clone(),
                "tools",
            ))),
            Arc::new(BannerService::new(Collection::<Banner>::new(
                store, "banners",
            ))),
        ));
        Router::new().nest("/api/admin", routes(service))
    }

    fn hoppscotch() -> Value {
        json!({
            "name": "Hoppscotch",
            "description": "Open source API development ecosystem",
            "category": "API Tools",
            "tags": ["api", "http"],
            "link": "https://hoppscotch.io",
            "featured": ["Hot"]
        })
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(app()).unwrap();
        server
            .get("/api/admin/entries")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_requires_admin_role() {
        let server = TestServer::new(with_visitor_auth(app())).unwrap();
        server
            .post("/api/admin/entries")
            .json(&hoppscotch())
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_entry_crud() {
        let server = TestServer::new(with_admin_auth(app())).unwrap();

        let created = server.post("/api/admin/entries").json(&hoppscotch()).await;
        created.assert_status(StatusCode::CREATED);
        let body: Value = created.json();
        assert_eq!(body["data"]["id"], "hoppscotch");
        assert_eq!(body["data"]["featured"], json!(["Hot"]));

        let mut renamed = hoppscotch();
        renamed["name"] = json!("Hoppscotch Web");
        let updated = server
            .put("/api/admin/entries/hoppscotch")
            .json(&renamed)
            .await;
        updated.assert_status_ok();
        let body: Value = updated.json();
        assert_eq!(body["data"]["id"], "hoppscotch");
        assert_eq!(body["data"]["name"], "Hoppscotch Web");

        let listed: Value = server.get("/api/admin/entries").await.json();
        assert_eq!(listed["meta"]["total"], 1);

        server
            .delete("/api/admin/entries/hoppscotch")
            .await
            .assert_status_ok();
        server
            .get("/api/admin/entries/hoppscotch")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_entry_lists_messages() {
        let server = TestServer::new(with_admin_auth(app())).unwrap();

        let mut invalid = hoppscotch();
        invalid["link"] = json!("hoppscotch.io");
        invalid["description"] = json!("short");

        let response = server.post("/api/admin/entries").json(&invalid).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(
            body["errors"],
            json!([
                "Description must be at least 10 characters.",
                "Please enter a valid URL."
            ])
        );
    }

    #[tokio::test]
    async fn test_banner_routes() {
        let server = TestServer::new(with_admin_auth(app())).unwrap();

        let created = server
            .post("/api/admin/banners")
            .json(&json!({"image_url": "https://img.dev/a.png", "link": "https://a.dev"}))
            .await;
        created.assert_status(StatusCode::CREATED);
        let id = created.json::<Value>()["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        server
            .put(&format!("/api/admin/banners/{}", id))
            .json(&json!({"image_url": "https://img.dev/b.png", "link": "https://b.dev"}))
            .await
            .assert_status_ok();

        server
            .delete(&format!("/api/admin/banners/{}", id))
            .await
            .assert_status_ok();

        server
            .delete(&format!("/api/admin/banners/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
