//! Subscription Routes - Recurring gifts

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use giftify::{NewSubscription, SubscriptionPatch};

use super::{domain_error, ApiError};
use crate::models::{
    CreateSubscriptionRequest, SenderQuery, SubscriptionResponse, UpdateSubscriptionRequest,
};
use crate::AppState;

/// Create a subscription
#[utoipa::path(
    post,
    path = "/giftify/subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid schedule or budget"),
        (status = 409, description = "Subscription already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Subscription"
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let request = NewSubscription::try_from(payload).map_err(domain_error)?;
    let subscription = state
        .subscriptions
        .create(request)
        .await
        .map_err(domain_error)?;

    Ok(Json(subscription.into()))
}

/// List a sender's subscriptions, newest first
#[utoipa::path(
    get,
    path = "/giftify/subscriptions",
    params(SenderQuery),
    responses(
        (status = 200, description = "Subscriptions", body = Vec<SubscriptionResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Subscription"
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<SenderQuery>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriptions = state
        .subscriptions
        .list(query.sender_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(
        subscriptions
            .into_iter()
            .map(SubscriptionResponse::from)
            .collect(),
    ))
}

/// Get subscription by ID
#[utoipa::path(
    get,
    path = "/giftify/subscriptions/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Subscription"
)]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = state.subscriptions.get(id).await.map_err(domain_error)?;
    Ok(Json(subscription.into()))
}

/// Update a subscription
#[utoipa::path(
    put,
    path = "/giftify/subscriptions/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = SubscriptionResponse),
        (status = 400, description = "Invalid schedule or budget"),
        (status = 403, description = "Caller is not the sender"),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Subscription"
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let sender_id = payload.sender_id;
    let patch = SubscriptionPatch::try_from(payload).map_err(domain_error)?;
    let subscription = state
        .subscriptions
        .update(id, sender_id, patch)
        .await
        .map_err(domain_error)?;

    Ok(Json(subscription.into()))
}

/// Deactivate a subscription
#[utoipa::path(
    delete,
    path = "/giftify/subscriptions/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscription ID"),
        SenderQuery
    ),
    responses(
        (status = 200, description = "Subscription deactivated", body = SubscriptionResponse),
        (status = 403, description = "Caller is not the sender"),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Subscription"
)]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SenderQuery>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = state
        .subscriptions
        .deactivate(id, query.sender_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(subscription.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/giftify/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/giftify/subscriptions/:id",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
}
