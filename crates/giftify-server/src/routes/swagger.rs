//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    // Gift models
    ApproveGiftRequest,
    CancelGiftRequest,
    CreateGiftRequest,
    // Subscription models
    CreateSubscriptionRequest,
    GiftResponse,
    SubscriptionResponse,
    SurpriseGiftRequest,
    // Scheduler models
    TickReportResponse,
    UpdateSubscriptionRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Gift endpoints
        super::gift::create_gift,
        super::gift::surprise,
        super::gift::get_gift,
        super::gift::list_sent,
        super::gift::list_received,
        super::gift::approve_gift,
        super::gift::cancel_gift,
        super::gift::mark_delivered,
        // Subscription endpoints
        super::subscription::create_subscription,
        super::subscription::list_subscriptions,
        super::subscription::get_subscription,
        super::subscription::update_subscription,
        super::subscription::delete_subscription,
        // Scheduler endpoints
        super::scheduler::run_tick,
    ),
    info(
        title = "Giftify API",
        version = "0.1.0",
        description = "Gift procurement orchestrator\n\nTurns a vibe and a budget into a delivered gift, with ordered fallback across delivery platforms and recurring subscriptions.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Gift", description = "Gift - Picking, approval and delivery"),
        (name = "Subscription", description = "Subscription - Recurring gifts"),
        (name = "Scheduler", description = "Scheduler - Subscription firing"),
    ),
    components(
        schemas(
            // Gift
            CreateGiftRequest,
            SurpriseGiftRequest,
            ApproveGiftRequest,
            CancelGiftRequest,
            GiftResponse,
            // Subscription
            CreateSubscriptionRequest,
            UpdateSubscriptionRequest,
            SubscriptionResponse,
            // Scheduler
            TickReportResponse,
        )
    )
)]
pub struct ApiDoc;
