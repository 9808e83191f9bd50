//! Authenticated trigger for the daily-log reminder sweep.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

use atelier_core::error::AppError;
use atelier_worker::SweepSummary;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared trigger secret.
pub const TRIGGER_SECRET_HEADER: &str = "x-cron-secret";

/// POST /api/internal/reminders/daily-logs
pub async fn trigger_daily_log_sweep(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SweepSummary>>, ApiError> {
    let expected = state.config.reminders.trigger_secret.as_str();
    if expected.is_empty() {
        return Err(AppError::service_unavailable("Reminder trigger is not configured").into());
    }
    let provided = headers
        .get(TRIGGER_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !secrets_match(provided, expected) {
        return Err(AppError::authentication("Invalid trigger secret").into());
    }

    let summary = state.reminders.sweep().await;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Compare digests of both values so timing reveals neither content nor length.
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
