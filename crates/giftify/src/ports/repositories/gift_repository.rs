//! Gift Repository Port
//!
//! Abstract interface for Gift persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Gift, GiftStatus};

/// Repository interface for Gift entities
#[async_trait]
pub trait GiftRepository: Send + Sync {
    /// Insert a new gift
    async fn create(&self, gift: &Gift) -> Result<Gift, DomainError>;

    /// Find a gift by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Gift>, DomainError>;

    /// Gifts sent by a user, newest first
    async fn find_by_sender(
        &self,
        sender_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError>;

    /// Gifts received by a user, newest first
    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError>;

    /// Every gift currently in `status`, oldest first
    async fn find_by_status(&self, status: GiftStatus) -> Result<Vec<Gift>, DomainError>;

    /// Persist `gift` only if the stored status still equals `expected`.
    ///
    /// Returns `false` when another writer advanced the gift first; nothing
    /// is written in that case. A gift that does not exist is `NotFound`.
    async fn update_if_status(&self, gift: &Gift, expected: GiftStatus)
        -> Result<bool, DomainError>;
}
