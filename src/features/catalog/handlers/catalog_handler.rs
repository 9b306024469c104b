use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use futures::{SinkExt, StreamExt};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::catalog::dtos::{
    CatalogQueryDto, CatalogViewDto, CategoriesDto, LiveCommand, LiveEvent,
};
use crate::features::catalog::services::{CatalogService, LiveCatalog};
use crate::features::catalog::session::CatalogSession;
use crate::modules::store::{Snapshot, Subscription};
use crate::shared::types::{ApiResponse, Meta};

/// Browse the catalog
///
/// Returns the derived categories and the entries matching every given filter.
#[utoipa::path(
    get,
    path = "/api/catalog",
    params(CatalogQueryDto),
    responses(
        (status = 200, description = "Catalog view", body = ApiResponse<CatalogViewDto>),
        (status = 400, description = "Invalid query string")
    ),
    tag = "catalog"
)]
pub async fn get_catalog(
    State(service): State<Arc<CatalogService>>,
    AppQuery(query): AppQuery<CatalogQueryDto>,
) -> Result<Json<ApiResponse<CatalogViewDto>>> {
    let view: CatalogViewDto = service.query(query.to_filter()).await.into();
    let total = view.total;
    let message = view.notice.clone();
    Ok(Json(ApiResponse::success(
        Some(view),
        message,
        Some(Meta::total(total)),
    )))
}

/// List categories
///
/// Distinct categories in byte order, with the `all` sentinel first.
#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    responses(
        (status = 200, description = "Category list", body = ApiResponse<CategoriesDto>),
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<ApiResponse<CategoriesDto>>> {
    let view = service.query(Default::default()).await;
    Ok(Json(ApiResponse::success(
        Some(CategoriesDto {
            categories: view.categories.as_ref().clone(),
            notice: view.notice,
        }),
        None,
        None,
    )))
}

/// Live catalog channel
///
/// WebSocket. Clients send `{"type":"set_search"|"set_category"|"set_featured","value":..}`;
/// the server answers every command and every store change with a fresh view.
#[utoipa::path(
    get,
    path = "/api/catalog/live",
    params(CatalogQueryDto),
    responses(
        (status = 101, description = "Switching to the WebSocket protocol"),
    ),
    tag = "catalog"
)]
pub async fn live_catalog(
    ws: WebSocketUpgrade,
    State(service): State<Arc<CatalogService>>,
    AppQuery(query): AppQuery<CatalogQueryDto>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service, query))
}

/// How often a live session without a feed retries the store
const LIVE_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Wait for the next snapshot; never resolves without a subscription.
async fn next_snapshot(subscription: &mut Option<Subscription>) -> Option<Arc<Snapshot>> {
    match subscription {
        Some(subscription) => subscription.changed().await,
        None => std::future::pending().await,
    }
}

async fn handle_socket(socket: WebSocket, service: Arc<CatalogService>, query: CatalogQueryDto) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "Live catalog connected");

    let LiveCatalog {
        mut session,
        mut subscription,
        mut notice,
    } = service.open_live(query.to_filter()).await;

    let (mut sink, mut stream) = socket.split();

    let mut outgoing = Some(LiveEvent::View(CatalogViewDto::from_session(
        &session,
        notice.clone(),
    )));

    loop {
        if let Some(event) = outgoing.take() {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode view");
                    break;
                }
            };
            if sink.send(Message::Text(payload.into())).await.is_err() {
                tracing::debug!(conn_id = %conn_id, "Live catalog sink closed");
                break;
            }
        }

        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if subscription.is_none() {
                        reconnect(&service, &mut session, &mut subscription, &mut notice).await;
                    }
                    outgoing = Some(match serde_json::from_str::<LiveCommand>(text.as_str()) {
                        Ok(command) => {
                            match command {
                                LiveCommand::SetSearch(term) => session.set_search_term(term),
                                LiveCommand::SetCategory(category) => session.set_category(&category),
                                LiveCommand::SetFeatured(label) => session.set_featured(&label),
                            }
                            LiveEvent::View(CatalogViewDto::from_session(&session, notice.clone()))
                        }
                        Err(e) => LiveEvent::Error {
                            message: format!("Invalid command: {}", e),
                        },
                    });
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Live catalog receive error");
                    break;
                }
            },
            snapshot = next_snapshot(&mut subscription) => match snapshot {
                Some(snapshot) => {
                    session.replace_snapshot(service.decode(&snapshot));
                    outgoing = Some(LiveEvent::View(CatalogViewDto::from_session(
                        &session,
                        notice.clone(),
                    )));
                }
                None => {
                    tracing::warn!(conn_id = %conn_id, "Snapshot feed closed");
                    subscription = None;
                }
            },
            _ = tokio::time::sleep(LIVE_RETRY_INTERVAL), if subscription.is_none() => {
                if reconnect(&service, &mut session, &mut subscription, &mut notice).await {
                    tracing::info!(conn_id = %conn_id, "Live catalog feed restored");
                    outgoing = Some(LiveEvent::View(CatalogViewDto::from_session(
                        &session,
                        notice.clone(),
                    )));
                }
            }
        }
    }

    tracing::info!(conn_id = %conn_id, "Live catalog disconnected");
}

/// Try to attach a feed to a session that has none. On success the session
/// moves to the current snapshot and the unavailable notice is cleared.
async fn reconnect(
    service: &CatalogService,
    session: &mut CatalogSession,
    subscription: &mut Option<Subscription>,
    notice: &mut Option<String>,
) -> bool {
    match service.reconnect_live().await {
        Some((feed, snapshot)) => {
            session.replace_snapshot(snapshot);
            *subscription = Some(feed);
            *notice = None;
            true
        }
        None => false,
    }
}
