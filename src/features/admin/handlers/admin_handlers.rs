use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::{BannerRequestDto, EntryRequestDto};
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::banners::dtos::BannerResponseDto;
use crate::features::entries::dtos::EntryResponseDto;
use crate::shared::types::{ApiResponse, Meta};

// =============================================================================
// ENTRIES
// =============================================================================

/// List all entries, newest first
#[utoipa::path(
    get,
    path = "/api/admin/entries",
    responses(
        (status = 200, description = "List of entries", body = ApiResponse<Vec<EntryResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_entries(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<EntryResponseDto>>>> {
    let items = service.list_entries().await?;
    let total = items.len();

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get one entry
#[utoipa::path(
    get,
    path = "/api/admin/entries/{id}",
    params(
        ("id" = String, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Entry found", body = ApiResponse<EntryResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Entry not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_entry(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EntryResponseDto>>> {
    let entry = service.get_entry(&id).await?;
    Ok(Json(ApiResponse::success(Some(entry), None, None)))
}

/// Create an entry
///
/// The id is derived from the name; a taken name gets a short random suffix.
#[utoipa::path(
    post,
    path = "/api/admin/entries",
    request_body = EntryRequestDto,
    responses(
        (status = 201, description = "Entry created", body = ApiResponse<EntryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_entry(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<EntryRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponseDto>>)> {
    let entry = service.create_entry(dto).await?;
    tracing::info!(uid = %user.uid, entry_id = %entry.id, "Entry created via API");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(entry),
            Some("Entry created".to_string()),
            None,
        )),
    ))
}

/// Update an entry
///
/// The id never changes, even when the name does.
#[utoipa::path(
    put,
    path = "/api/admin/entries/{id}",
    params(
        ("id" = String, Path, description = "Entry id")
    ),
    request_body = EntryRequestDto,
    responses(
        (status = 200, description = "Entry updated", body = ApiResponse<EntryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Entry not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_entry(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<EntryRequestDto>,
) -> Result<Json<ApiResponse<EntryResponseDto>>> {
    let entry = service.update_entry(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(entry),
        Some("Entry updated".to_string()),
        None,
    )))
}

/// Delete an entry
#[utoipa::path(
    delete,
    path = "/api/admin/entries/{id}",
    params(
        ("id" = String, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Entry not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_entry(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_entry(&id).await?;
    tracing::info!(uid = %user.uid, entry_id = %id, "Entry deleted via API");
    Ok(Json(ApiResponse::success(
        None,
        Some("Entry deleted".to_string()),
        None,
    )))
}

// =============================================================================
// BANNERS
// =============================================================================

/// List all banners, newest first
#[utoipa::path(
    get,
    path = "/api/admin/banners",
    responses(
        (status = 200, description = "List of banners", body = ApiResponse<Vec<BannerResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_banners(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<BannerResponseDto>>>> {
    let items = service.list_banners().await?;
    let total = items.len();

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::total(total)),
    )))
}

/// Create a banner
#[utoipa::path(
    post,
    path = "/api/admin/banners",
    request_body = BannerRequestDto,
    responses(
        (status = 201, description = "Banner created", body = ApiResponse<BannerResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_banner(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BannerRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<BannerResponseDto>>)> {
    let banner = service.create_banner(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(banner),
            Some("Banner created".to_string()),
            None,
        )),
    ))
}

/// Update a banner
#[utoipa::path(
    put,
    path = "/api/admin/banners/{id}",
    params(
        ("id" = String, Path, description = "Banner id")
    ),
    request_body = BannerRequestDto,
    responses(
        (status = 200, description = "Banner updated", body = ApiResponse<BannerResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Banner not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_banner(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<BannerRequestDto>,
) -> Result<Json<ApiResponse<BannerResponseDto>>> {
    let banner = service.update_banner(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(banner),
        Some("Banner updated".to_string()),
        None,
    )))
}

/// Delete a banner
#[utoipa::path(
    delete,
    path = "/api/admin/banners/{id}",
    params(
        ("id" = String, Path, description = "Banner id")
    ),
    responses(
        (status = 200, description = "Banner deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Banner not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_banner(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_banner(&id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Banner deleted".to_string()),
        None,
    )))
}
