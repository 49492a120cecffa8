//! Scheduler Routes - Manual tick

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use super::ApiError;
use crate::models::TickReportResponse;
use crate::AppState;

/// Run one scheduler tick now
#[utoipa::path(
    post,
    path = "/giftify/scheduler/tick",
    responses(
        (status = 200, description = "Tick completed", body = TickReportResponse),
        (status = 409, description = "A tick is already running")
    ),
    tag = "Scheduler"
)]
pub async fn run_tick(
    State(state): State<AppState>,
) -> Result<Json<TickReportResponse>, ApiError> {
    tracing::info!("🔄 Manual scheduler tick requested");
    let report = state
        .scheduler
        .tick()
        .await
        .map_err(|e| (StatusCode::CONFLICT, e.to_string()))?;

    Ok(Json(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/giftify/scheduler/tick", post(run_tick))
}
