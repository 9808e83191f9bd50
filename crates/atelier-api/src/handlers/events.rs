//! Event intake from the business layer.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::dto::request::PublishEventRequest;
use crate::dto::response::{ApiResponse, EventAcceptedResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/events
///
/// The caller's own write has already succeeded, so delivery runs in the
/// background and its outcome never reaches this response.
pub async fn publish_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<PublishEventRequest>,
) -> (StatusCode, Json<ApiResponse<EventAcceptedResponse>>) {
    let event = req.into_event(auth.user_id);
    let event_id = event.id;
    info!(%event_id, event = event.payload.name(), actor_id = %auth.user_id, "Event accepted");
    state.notifier.spawn(event);
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(EventAcceptedResponse { event_id })),
    )
}
