//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;
use uuid::Uuid;

use super::value_objects::{DeliveryPlatform, GiftStatus};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition for gift {gift_id}: {from} -> {to}")]
    InvalidTransition {
        gift_id: Uuid,
        from: GiftStatus,
        to: GiftStatus,
    },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The provider accepted an order for a gift that was cancelled while
    /// the order was in flight. Compensation is not automated.
    #[error("Order {order_id} on {platform} placed for cancelled gift {gift_id}")]
    OrphanedOrder {
        gift_id: Uuid,
        platform: DeliveryPlatform,
        order_id: String,
    },
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: Uuid) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error means another writer got there first
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::InvalidTransition { .. })
    }
}
