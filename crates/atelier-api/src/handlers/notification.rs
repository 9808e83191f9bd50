//! Inbox handlers. Every route acts on the caller's own notifications.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use atelier_core::error::AppError;
use atelier_core::types::id::NotificationId;

use crate::dto::request::ListNotificationsQuery;
use crate::dto::response::{ApiResponse, CountResponse, NotificationResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let records = state.inbox.list(&auth, query.limit).await?;
    Ok(Json(ApiResponse::ok(
        records.into_iter().map(NotificationResponse::from).collect(),
    )))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.inbox.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
    state.inbox.mark_read(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.inbox.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
    state.inbox.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
