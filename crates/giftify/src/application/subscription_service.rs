//! Subscription Application Service (Use Case)
//!
//! Orchestrates subscription management. Firing is the scheduler's job.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{DomainError, GiftSubscription, NewSubscription, SubscriptionPatch};
use crate::ports::{Clock, SubscriptionRepository};

/// Application service for subscription operations
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Create a new active subscription
    pub async fn create(&self, request: NewSubscription) -> Result<GiftSubscription, DomainError> {
        let subscription = GiftSubscription::new(request, self.clock.now())?;
        let saved = self.repo.create(&subscription).await?;

        tracing::info!(
            subscription_id = %saved.id,
            "Created {} subscription from {} to {}",
            saved.frequency,
            saved.sender_id,
            saved.recipient_id
        );

        Ok(saved)
    }

    /// Subscriptions owned by a sender, newest first
    pub async fn list(&self, sender_id: Uuid) -> Result<Vec<GiftSubscription>, DomainError> {
        self.repo.find_by_sender(sender_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<GiftSubscription, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("GiftSubscription", id))
    }

    /// Update schedule, template or active flag
    pub async fn update(
        &self,
        id: Uuid,
        sender_id: Uuid,
        patch: SubscriptionPatch,
    ) -> Result<GiftSubscription, DomainError> {
        let mut subscription = self.owned(id, sender_id).await?;
        subscription.apply(patch, self.clock.now())?;
        self.repo.save(&subscription).await
    }

    /// Stop a subscription from firing; it stays listed
    pub async fn deactivate(
        &self,
        id: Uuid,
        sender_id: Uuid,
    ) -> Result<GiftSubscription, DomainError> {
        let deactivated = self
            .update(
                id,
                sender_id,
                SubscriptionPatch {
                    is_active: Some(false),
                    ..SubscriptionPatch::default()
                },
            )
            .await?;
        tracing::info!(subscription_id = %id, "Deactivated subscription");
        Ok(deactivated)
    }

    async fn owned(&self, id: Uuid, sender_id: Uuid) -> Result<GiftSubscription, DomainError> {
        let subscription = self.get(id).await?;
        if subscription.sender_id != sender_id {
            return Err(DomainError::Forbidden(format!(
                "subscription {} belongs to another sender",
                id
            )));
        }
        Ok(subscription)
    }
}
