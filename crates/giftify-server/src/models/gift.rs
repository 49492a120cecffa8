//! Gift DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use giftify::{Gift, NewGift, Submission, SurpriseRequest};

/// Create gift request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGiftRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// Free-text mood, e.g. "send something chaotic"
    pub vibe_prompt: String,
    #[serde(default)]
    pub budget_min: f64,
    pub budget_max: f64,
    /// Skip sender approval and order immediately
    #[serde(default)]
    pub is_surprise: bool,
    /// Defaults to the recipient's saved address
    pub delivery_address: Option<String>,
    pub sender_message: Option<String>,
}

impl From<CreateGiftRequest> for NewGift {
    fn from(request: CreateGiftRequest) -> Self {
        Self {
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            vibe_prompt: request.vibe_prompt,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
            is_surprise: request.is_surprise,
            delivery_address: request.delivery_address,
            sender_message: request.sender_message,
        }
    }
}

/// Quick surprise request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SurpriseGiftRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub budget_max: f64,
    /// Defaults to 0
    pub budget_min: Option<f64>,
    /// Defaults to "something chaotic and fun"
    pub vibe_prompt: Option<String>,
    pub sender_message: Option<String>,
}

impl From<SurpriseGiftRequest> for SurpriseRequest {
    fn from(request: SurpriseGiftRequest) -> Self {
        Self {
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            budget_max: request.budget_max,
            budget_min: request.budget_min,
            vibe_prompt: request.vibe_prompt,
            sender_message: request.sender_message,
        }
    }
}

/// Sender's approval decision
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveGiftRequest {
    pub sender_id: Uuid,
    pub approved: bool,
}

/// Cancel request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelGiftRequest {
    pub reason: Option<String>,
}

/// Optional status filter for gift listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct GiftListQuery {
    /// pending, agent_picking, awaiting_approval, ordered, shipped, delivered, cancelled
    pub status: Option<String>,
}

/// Gift response
#[derive(Debug, Serialize, ToSchema)]
pub struct GiftResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub vibe_prompt: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub is_surprise: bool,
    pub status: String,
    pub gift_name: Option<String>,
    pub gift_description: Option<String>,
    pub gift_price: Option<f64>,
    pub gift_image_url: Option<String>,
    pub category: Option<String>,
    pub agent_reasoning: Option<String>,
    pub platform: Option<String>,
    pub order_id: Option<String>,
    pub tracking_url: Option<String>,
    pub delivery_address: Option<String>,
    pub sender_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ordered_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<Gift> for GiftResponse {
    fn from(gift: Gift) -> Self {
        let (gift_name, gift_description, gift_price, gift_image_url, category) =
            match gift.selection {
                Some(s) => (
                    Some(s.name),
                    Some(s.description),
                    Some(s.price),
                    Some(s.image_url),
                    Some(s.category.to_string()),
                ),
                None => (None, None, None, None, None),
            };
        let (platform, order_id, tracking_url) = match gift.dispatch {
            Some(d) => (Some(d.platform.to_string()), Some(d.order_id), d.tracking_url),
            None => (None, None, None),
        };

        Self {
            id: gift.id,
            sender_id: gift.sender_id,
            recipient_id: gift.recipient_id,
            vibe_prompt: gift.vibe_prompt,
            budget_min: gift.budget_min,
            budget_max: gift.budget_max,
            is_surprise: gift.is_surprise,
            status: gift.status.to_string(),
            gift_name,
            gift_description,
            gift_price,
            gift_image_url,
            category,
            agent_reasoning: gift.agent_reasoning,
            platform,
            order_id,
            tracking_url,
            delivery_address: gift.delivery_address,
            sender_message: gift.sender_message,
            created_at: gift.created_at,
            ordered_at: gift.ordered_at,
            delivered_at: gift.delivered_at,
        }
    }
}

impl From<Submission> for GiftResponse {
    fn from(submission: Submission) -> Self {
        submission.gift.into()
    }
}
