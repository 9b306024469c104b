use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::entries::dtos::EntryResponseDto;
use crate::features::entries::services::EntryService;
use crate::shared::types::ApiResponse;

/// Get a catalog entry by id
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    params(
        ("id" = String, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Entry found", body = ApiResponse<EntryResponseDto>),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries"
)]
pub async fn get_entry(
    State(service): State<Arc<EntryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EntryResponseDto>>> {
    let entry = service.get(&id).await?;
    Ok(Json(ApiResponse::success(Some(entry), None, None)))
}
