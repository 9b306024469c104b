use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::banners::dtos::BannerResponseDto;
use crate::features::banners::services::BannerService;
use crate::shared::types::{ApiResponse, Meta};

/// List carousel banners, newest first
#[utoipa::path(
    get,
    path = "/api/banners",
    responses(
        (status = 200, description = "List of banners", body = ApiResponse<Vec<BannerResponseDto>>),
    ),
    tag = "banners"
)]
pub async fn list_banners(
    State(service): State<Arc<BannerService>>,
) -> Result<Json<ApiResponse<Vec<BannerResponseDto>>>> {
    let banners = service.list().await?;
    let total = banners.len();
    Ok(Json(ApiResponse::success(
        Some(banners),
        None,
        Some(Meta::total(total)),
    )))
}
