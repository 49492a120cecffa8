//! In-memory stores
//!
//! HashMap-backed implementations of the repository and persona ports.
//! The gift compare-and-set runs under a single write lock, which gives the
//! same guarantee as the conditional UPDATE in the PostgreSQL adapter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{DomainError, Gift, GiftStatus, GiftSubscription, PersonaHints};
use crate::ports::{AddressResolver, GiftRepository, PersonaReader, SubscriptionRepository};

/// In-memory GiftRepository
#[derive(Debug, Default)]
pub struct InMemoryGiftRepository {
    gifts: RwLock<HashMap<Uuid, Gift>>,
    fail_next_update: AtomicBool,
}

impl InMemoryGiftRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `update_if_status` fail with a repository error
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.gifts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.gifts.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<Gift> {
        newest_first(self.gifts.read().await.values().cloned().collect())
    }
}

fn newest_first(mut gifts: Vec<Gift>) -> Vec<Gift> {
    gifts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    gifts
}

#[async_trait]
impl GiftRepository for InMemoryGiftRepository {
    async fn create(&self, gift: &Gift) -> Result<Gift, DomainError> {
        let mut gifts = self.gifts.write().await;
        if gifts.contains_key(&gift.id) {
            return Err(DomainError::Conflict(format!("gift {} already exists", gift.id)));
        }
        gifts.insert(gift.id, gift.clone());
        Ok(gift.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Gift>, DomainError> {
        Ok(self.gifts.read().await.get(&id).cloned())
    }

    async fn find_by_sender(
        &self,
        sender_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError> {
        let gifts = self.gifts.read().await;
        Ok(newest_first(
            gifts
                .values()
                .filter(|g| g.sender_id == sender_id)
                .filter(|g| status.map_or(true, |s| g.status == s))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError> {
        let gifts = self.gifts.read().await;
        Ok(newest_first(
            gifts
                .values()
                .filter(|g| g.recipient_id == recipient_id)
                .filter(|g| status.map_or(true, |s| g.status == s))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_status(&self, status: GiftStatus) -> Result<Vec<Gift>, DomainError> {
        let mut gifts: Vec<Gift> = self
            .gifts
            .read()
            .await
            .values()
            .filter(|g| g.status == status)
            .cloned()
            .collect();
        gifts.sort_by_key(|g| g.created_at);
        Ok(gifts)
    }

    async fn update_if_status(
        &self,
        gift: &Gift,
        expected: GiftStatus,
    ) -> Result<bool, DomainError> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(DomainError::Repository("simulated write failure".to_string()));
        }
        let mut gifts = self.gifts.write().await;
        match gifts.get_mut(&gift.id) {
            Some(stored) if stored.status == expected => {
                *stored = gift.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found("Gift", gift.id)),
        }
    }
}

/// In-memory SubscriptionRepository
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<Uuid, GiftSubscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(
        &self,
        subscription: &GiftSubscription,
    ) -> Result<GiftSubscription, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::Conflict(format!(
                "subscription {} already exists",
                subscription.id
            )));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GiftSubscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(&id).cloned())
    }

    async fn find_by_sender(&self, sender_id: Uuid) -> Result<Vec<GiftSubscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        let mut found: Vec<_> = subscriptions
            .values()
            .filter(|s| s.sender_id == sender_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_active(&self) -> Result<Vec<GiftSubscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        let mut active: Vec<_> = subscriptions
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(active)
    }

    async fn save(&self, subscription: &GiftSubscription) -> Result<GiftSubscription, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        let stored = subscriptions
            .get_mut(&subscription.id)
            .ok_or_else(|| DomainError::not_found("GiftSubscription", subscription.id))?;

        // Runtime state belongs to the scheduler
        let mut updated = subscription.clone();
        updated.last_sent_at = stored.last_sent_at;
        updated.total_gifts_sent = stored.total_gifts_sent;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn record_send(
        &self,
        subscription: &GiftSubscription,
        previous_last_sent: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(&subscription.id) {
            Some(stored) if stored.last_sent_at == previous_last_sent => {
                stored.last_sent_at = subscription.last_sent_at;
                stored.next_send_at = subscription.next_send_at;
                stored.total_gifts_sent = subscription.total_gifts_sent;
                stored.updated_at = subscription.updated_at;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found("GiftSubscription", subscription.id)),
        }
    }
}

/// In-memory persona store serving both persona hints and addresses
#[derive(Debug, Default)]
pub struct InMemoryPersonaStore {
    personas: RwLock<HashMap<Uuid, PersonaHints>>,
    addresses: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryPersonaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_persona(&self, user_id: Uuid, persona: PersonaHints) {
        self.personas.write().await.insert(user_id, persona);
    }

    pub async fn set_address(&self, user_id: Uuid, address: impl Into<String>) {
        self.addresses.write().await.insert(user_id, address.into());
    }
}

#[async_trait]
impl PersonaReader for InMemoryPersonaStore {
    async fn get_persona(&self, recipient_id: Uuid) -> Result<Option<PersonaHints>, DomainError> {
        Ok(self.personas.read().await.get(&recipient_id).cloned())
    }
}

#[async_trait]
impl AddressResolver for InMemoryPersonaStore {
    async fn get_delivery_address(
        &self,
        recipient_id: Uuid,
    ) -> Result<Option<String>, DomainError> {
        Ok(self.addresses.read().await.get(&recipient_id).cloned())
    }
}
