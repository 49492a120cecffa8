//! Gift Routes - Creation, approval and lifecycle
//!
//! Picking and dispatch run on the background worker; create/approve
//! respond with the gift as persisted before that work starts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use giftify::GiftStatus;

use super::{domain_error, ApiError};
use crate::models::{
    ApproveGiftRequest, CancelGiftRequest, CreateGiftRequest, GiftListQuery, GiftResponse,
    SurpriseGiftRequest,
};
use crate::AppState;

const DEFAULT_CANCEL_REASON: &str = "cancelled by user";

fn status_filter(query: &GiftListQuery) -> Result<Option<GiftStatus>, ApiError> {
    query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))
}

fn responses(gifts: Vec<giftify::Gift>) -> Json<Vec<GiftResponse>> {
    Json(gifts.into_iter().map(GiftResponse::from).collect())
}

/// Create a gift and start picking
#[utoipa::path(
    post,
    path = "/giftify/gifts",
    request_body = CreateGiftRequest,
    responses(
        (status = 200, description = "Gift created, agent is picking", body = GiftResponse),
        (status = 400, description = "Invalid budget or missing address"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn create_gift(
    State(state): State<AppState>,
    Json(payload): Json<CreateGiftRequest>,
) -> Result<Json<GiftResponse>, ApiError> {
    let submission = state
        .gifts
        .create_gift(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(submission.into()))
}

/// Quick surprise: defaults everything but the maximum budget
#[utoipa::path(
    post,
    path = "/giftify/surprise",
    request_body = SurpriseGiftRequest,
    responses(
        (status = 200, description = "Surprise gift created", body = GiftResponse),
        (status = 400, description = "Invalid budget or missing address"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn surprise(
    State(state): State<AppState>,
    Json(payload): Json<SurpriseGiftRequest>,
) -> Result<Json<GiftResponse>, ApiError> {
    let submission = state
        .gifts
        .surprise(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(submission.into()))
}

/// Get gift by ID
#[utoipa::path(
    get,
    path = "/giftify/gifts/{id}",
    params(
        ("id" = Uuid, Path, description = "Gift ID")
    ),
    responses(
        (status = 200, description = "Gift found", body = GiftResponse),
        (status = 404, description = "Gift not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn get_gift(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GiftResponse>, ApiError> {
    let gift = state.gifts.get_gift(id).await.map_err(domain_error)?;
    Ok(Json(gift.into()))
}

/// Gifts a user has sent, newest first
#[utoipa::path(
    get,
    path = "/giftify/users/{user_id}/gifts/sent",
    params(
        ("user_id" = Uuid, Path, description = "Sender ID"),
        GiftListQuery
    ),
    responses(
        (status = 200, description = "Sent gifts", body = Vec<GiftResponse>),
        (status = 400, description = "Unknown status filter"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn list_sent(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<GiftListQuery>,
) -> Result<Json<Vec<GiftResponse>>, ApiError> {
    let status = status_filter(&query)?;
    let gifts = state
        .gifts
        .list_sent(user_id, status)
        .await
        .map_err(domain_error)?;
    Ok(responses(gifts))
}

/// Gifts a user has received, newest first
#[utoipa::path(
    get,
    path = "/giftify/users/{user_id}/gifts/received",
    params(
        ("user_id" = Uuid, Path, description = "Recipient ID"),
        GiftListQuery
    ),
    responses(
        (status = 200, description = "Received gifts", body = Vec<GiftResponse>),
        (status = 400, description = "Unknown status filter"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn list_received(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<GiftListQuery>,
) -> Result<Json<Vec<GiftResponse>>, ApiError> {
    let status = status_filter(&query)?;
    let gifts = state
        .gifts
        .list_received(user_id, status)
        .await
        .map_err(domain_error)?;
    Ok(responses(gifts))
}

/// Approve or reject a picked gift
#[utoipa::path(
    post,
    path = "/giftify/gifts/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Gift ID")
    ),
    request_body = ApproveGiftRequest,
    responses(
        (status = 200, description = "Approved (ordering) or rejected (cancelled)", body = GiftResponse),
        (status = 403, description = "Caller is not the sender"),
        (status = 404, description = "Gift not found"),
        (status = 409, description = "Gift is not awaiting approval"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn approve_gift(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveGiftRequest>,
) -> Result<Json<GiftResponse>, ApiError> {
    let submission = state
        .gifts
        .approve(id, payload.sender_id, payload.approved)
        .await
        .map_err(domain_error)?;

    Ok(Json(submission.into()))
}

/// Cancel a gift that has not shipped yet
#[utoipa::path(
    post,
    path = "/giftify/gifts/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Gift ID")
    ),
    request_body = CancelGiftRequest,
    responses(
        (status = 200, description = "Gift cancelled", body = GiftResponse),
        (status = 404, description = "Gift not found"),
        (status = 409, description = "Gift can no longer be cancelled"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn cancel_gift(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<CancelGiftRequest>>,
) -> Result<Json<GiftResponse>, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    let reason = payload.reason.as_deref().unwrap_or(DEFAULT_CANCEL_REASON);
    let gift = state
        .gifts
        .cancel(id, reason)
        .await
        .map_err(domain_error)?;

    Ok(Json(gift.into()))
}

/// Confirm delivery of a shipped gift
#[utoipa::path(
    post,
    path = "/giftify/gifts/{id}/delivered",
    params(
        ("id" = Uuid, Path, description = "Gift ID")
    ),
    responses(
        (status = 200, description = "Gift delivered", body = GiftResponse),
        (status = 404, description = "Gift not found"),
        (status = 409, description = "Gift has not shipped"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Gift"
)]
pub async fn mark_delivered(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GiftResponse>, ApiError> {
    let gift = state
        .gifts
        .mark_delivered(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(gift.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/giftify/gifts", post(create_gift))
        .route("/giftify/surprise", post(surprise))
        .route("/giftify/gifts/:id", get(get_gift))
        .route("/giftify/gifts/:id/approve", post(approve_gift))
        .route("/giftify/gifts/:id/cancel", post(cancel_gift))
        .route("/giftify/gifts/:id/delivered", post(mark_delivered))
        .route("/giftify/users/:user_id/gifts/sent", get(list_sent))
        .route("/giftify/users/:user_id/gifts/received", get(list_received))
}
