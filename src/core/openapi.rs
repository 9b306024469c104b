use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::banners::{dtos as banners_dtos, handlers as banners_handlers};
use crate::features::catalog::{dtos as catalog_dtos, handlers as catalog_handlers};
use crate::features::entries::{dtos as entries_dtos, handlers as entries_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        // Catalog (public)
        catalog_handlers::get_catalog,
        catalog_handlers::list_categories,
        catalog_handlers::live_catalog,
        // Entries (public)
        entries_handlers::get_entry,
        // Banners (public)
        banners_handlers::list_banners,
        // Admin
        admin_handlers::list_entries,
        admin_handlers::get_entry,
        admin_handlers::create_entry,
        admin_handlers::update_entry,
        admin_handlers::delete_entry,
        admin_handlers::list_banners,
        admin_handlers::create_banner,
        admin_handlers::update_banner,
        admin_handlers::delete_banner,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::MeResponseDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::RefreshTokenResponseDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            ApiResponse<auth::dtos::MeResponseDto>,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::RefreshTokenResponseDto>,
            // Catalog
            catalog_dtos::EntryCardDto,
            catalog_dtos::CatalogFilterDto,
            catalog_dtos::CatalogViewDto,
            catalog_dtos::CategoriesDto,
            catalog_dtos::LiveCommand,
            catalog_dtos::LiveEvent,
            ApiResponse<catalog_dtos::CatalogViewDto>,
            ApiResponse<catalog_dtos::CategoriesDto>,
            // Entries
            entries_dtos::EntryResponseDto,
            ApiResponse<entries_dtos::EntryResponseDto>,
            ApiResponse<Vec<entries_dtos::EntryResponseDto>>,
            // Banners
            banners_dtos::BannerResponseDto,
            ApiResponse<banners_dtos::BannerResponseDto>,
            ApiResponse<Vec<banners_dtos::BannerResponseDto>>,
            // Admin
            admin_dtos::EntryRequestDto,
            admin_dtos::BannerRequestDto,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Browse and filter the tool catalog (public)"),
        (name = "entries", description = "Catalog entry details (public)"),
        (name = "banners", description = "Home page carousel banners (public)"),
        (name = "admin", description = "Catalog and banner management (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "RepoSource API",
        version = "0.1.0",
        description = "API documentation for RepoSource",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Catalog".to_string(),
            version: "9.9.9".to_string(),
            description: "Test".to_string(),
        }
        .modify(&mut openapi);

        assert_eq!(openapi.info.title, "Catalog");
        assert!(openapi.paths.paths.contains_key("/api/catalog"));
        assert!(openapi.paths.paths.contains_key("/api/admin/entries/{id}"));
        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
