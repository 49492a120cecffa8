//! Gift - A single procurement attempt
//!
//! Status changes only through the guarded methods below, each of which
//! checks the edge against [`GiftStatus::can_transition_to`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{DeliveryPlatform, GiftCategory, GiftStatus};

/// Gift - sender, recipient, request, and the results of selection and dispatch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gift {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub vibe_prompt: String,
    pub budget_min: f64,
    pub budget_max: f64,
    /// Surprise (YOLO) gifts skip the approval gate
    pub is_surprise: bool,
    pub delivery_address: Option<String>,
    pub sender_message: Option<String>,
    pub selection: Option<GiftSelection>,
    /// Human-readable explanation of the pick, or why the gift was cancelled
    pub agent_reasoning: Option<String>,
    pub dispatch: Option<DispatchRecord>,
    pub status: GiftStatus,
    pub created_at: DateTime<Utc>,
    pub ordered_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Item chosen by the selection engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GiftSelection {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    /// Category the request was classified into (not necessarily the item's shelf)
    pub category: GiftCategory,
}

/// Order placed with a delivery platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchRecord {
    pub platform: DeliveryPlatform,
    pub order_id: String,
    pub tracking_url: Option<String>,
}

/// Request to create a gift
#[derive(Debug, Clone, Default)]
pub struct NewGift {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub vibe_prompt: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub is_surprise: bool,
    pub delivery_address: Option<String>,
    pub sender_message: Option<String>,
}

/// Check a budget range: finite, non-negative, min <= max
pub fn validate_budget(budget_min: f64, budget_max: f64) -> Result<(), DomainError> {
    if !budget_min.is_finite() || !budget_max.is_finite() {
        return Err(DomainError::validation("budget must be a finite number"));
    }
    if budget_min < 0.0 || budget_max < 0.0 {
        return Err(DomainError::validation("budget must not be negative"));
    }
    if budget_min > budget_max {
        return Err(DomainError::validation(format!(
            "budget_min ({}) exceeds budget_max ({})",
            budget_min, budget_max
        )));
    }
    Ok(())
}

impl NewGift {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_budget(self.budget_min, self.budget_max)?;
        if self.sender_id == self.recipient_id {
            return Err(DomainError::validation("cannot send a gift to yourself"));
        }
        Ok(())
    }
}

impl Gift {
    /// Create a new gift in `Pending`
    pub fn new(request: NewGift, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            vibe_prompt: request.vibe_prompt,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
            is_surprise: request.is_surprise,
            delivery_address: request
                .delivery_address
                .filter(|address| !address.trim().is_empty()),
            sender_message: request.sender_message,
            selection: None,
            agent_reasoning: None,
            dispatch: None,
            status: GiftStatus::Pending,
            created_at: now,
            ordered_at: None,
            delivered_at: None,
        }
    }

    fn transition(&mut self, to: GiftStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                gift_id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    fn append_reasoning(&mut self, text: &str) {
        self.agent_reasoning = Some(match self.agent_reasoning.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n\n{text}"),
            _ => text.to_string(),
        });
    }

    /// PENDING -> AGENT_PICKING
    pub fn start_picking(&mut self) -> Result<(), DomainError> {
        self.transition(GiftStatus::AgentPicking)
    }

    /// AGENT_PICKING -> AWAITING_APPROVAL, or ORDERED for surprise gifts
    pub fn record_selection(
        &mut self,
        selection: GiftSelection,
        reasoning: String,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let next = if self.is_surprise {
            GiftStatus::Ordered
        } else {
            GiftStatus::AwaitingApproval
        };
        self.transition(next)?;
        self.selection = Some(selection);
        self.agent_reasoning = Some(reasoning);
        if next == GiftStatus::Ordered {
            self.ordered_at.get_or_insert(now);
        }
        Ok(())
    }

    /// AWAITING_APPROVAL -> ORDERED
    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != GiftStatus::AwaitingApproval {
            return Err(DomainError::InvalidTransition {
                gift_id: self.id,
                from: self.status,
                to: GiftStatus::Ordered,
            });
        }
        self.transition(GiftStatus::Ordered)?;
        self.ordered_at.get_or_insert(now);
        Ok(())
    }

    /// AWAITING_APPROVAL -> CANCELLED
    pub fn reject(&mut self) -> Result<(), DomainError> {
        if self.status != GiftStatus::AwaitingApproval {
            return Err(DomainError::InvalidTransition {
                gift_id: self.id,
                from: self.status,
                to: GiftStatus::Cancelled,
            });
        }
        self.cancel("Rejected by sender.")
    }

    /// Any cancellable status -> CANCELLED, appending `reason` to the reasoning
    pub fn cancel(&mut self, reason: &str) -> Result<(), DomainError> {
        self.transition(GiftStatus::Cancelled)?;
        self.append_reasoning(reason);
        Ok(())
    }

    /// ORDERED -> SHIPPED
    pub fn mark_shipped(&mut self, record: DispatchRecord) -> Result<(), DomainError> {
        self.transition(GiftStatus::Shipped)?;
        self.dispatch = Some(record);
        Ok(())
    }

    /// SHIPPED -> DELIVERED
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(GiftStatus::Delivered)?;
        self.delivered_at.get_or_insert(now);
        Ok(())
    }
}
