//! GiftSubscription Repository Port
//!
//! Abstract interface for GiftSubscription persistence operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{errors::DomainError, GiftSubscription};

/// Repository interface for GiftSubscription entities
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription
    async fn create(&self, subscription: &GiftSubscription)
        -> Result<GiftSubscription, DomainError>;

    /// Find a subscription by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<GiftSubscription>, DomainError>;

    /// All subscriptions owned by a sender
    async fn find_by_sender(&self, sender_id: Uuid) -> Result<Vec<GiftSubscription>, DomainError>;

    /// All subscriptions with `is_active = true`
    async fn find_active(&self) -> Result<Vec<GiftSubscription>, DomainError>;

    /// Persist schedule/template edits made by the owner
    async fn save(&self, subscription: &GiftSubscription)
        -> Result<GiftSubscription, DomainError>;

    /// Persist the runtime state after a fire, only if the stored
    /// `last_sent_at` still equals `previous_last_sent`.
    ///
    /// Returns `false` when another scheduler instance already recorded the send.
    async fn record_send(
        &self,
        subscription: &GiftSubscription,
        previous_last_sent: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError>;
}
