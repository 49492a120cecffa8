//! PostgreSQL implementation of GiftRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use giftify::{DispatchRecord, DomainError, Gift, GiftRepository, GiftSelection, GiftStatus};

/// PostgreSQL implementation of GiftRepository
pub struct PgGiftRepository {
    pool: PgPool,
}

impl PgGiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct GiftRow {
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    vibe_prompt: String,
    budget_min: f64,
    budget_max: f64,
    is_surprise: bool,
    delivery_address: Option<String>,
    sender_message: Option<String>,
    gift_name: Option<String>,
    gift_description: Option<String>,
    gift_price: Option<f64>,
    gift_image_url: Option<String>,
    gift_category: Option<String>,
    agent_reasoning: Option<String>,
    platform: Option<String>,
    order_id: Option<String>,
    tracking_url: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    ordered_at: Option<chrono::DateTime<chrono::Utc>>,
    delivered_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<GiftRow> for Gift {
    type Error = DomainError;

    fn try_from(row: GiftRow) -> Result<Self, Self::Error> {
        let selection = match (row.gift_name, row.gift_price) {
            (Some(name), Some(price)) => Some(GiftSelection {
                name,
                description: row.gift_description.unwrap_or_default(),
                price,
                image_url: row.gift_image_url.unwrap_or_default(),
                category: row
                    .gift_category
                    .and_then(|c| c.parse().ok())
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        let dispatch = match (row.platform, row.order_id) {
            (Some(platform), Some(order_id)) => Some(DispatchRecord {
                platform: platform.parse().map_err(DomainError::Repository)?,
                order_id,
                tracking_url: row.tracking_url,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            vibe_prompt: row.vibe_prompt,
            budget_min: row.budget_min,
            budget_max: row.budget_max,
            is_surprise: row.is_surprise,
            delivery_address: row.delivery_address,
            sender_message: row.sender_message,
            selection,
            agent_reasoning: row.agent_reasoning,
            dispatch,
            status: row.status.parse().map_err(DomainError::Repository)?,
            created_at: row.created_at,
            ordered_at: row.ordered_at,
            delivered_at: row.delivered_at,
        })
    }
}

fn into_gifts(rows: Vec<GiftRow>) -> Result<Vec<Gift>, DomainError> {
    rows.into_iter().map(Gift::try_from).collect()
}

#[async_trait]
impl GiftRepository for PgGiftRepository {
    async fn create(&self, gift: &Gift) -> Result<Gift, DomainError> {
        let row = sqlx::query_as::<_, GiftRow>(
            r#"
            INSERT INTO gifts (id, sender_id, recipient_id, vibe_prompt, budget_min, budget_max,
                               is_surprise, delivery_address, sender_message, agent_reasoning,
                               status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(gift.id)
        .bind(gift.sender_id)
        .bind(gift.recipient_id)
        .bind(&gift.vibe_prompt)
        .bind(gift.budget_min)
        .bind(gift.budget_max)
        .bind(gift.is_surprise)
        .bind(&gift.delivery_address)
        .bind(&gift.sender_message)
        .bind(&gift.agent_reasoning)
        .bind(gift.status.as_str())
        .bind(gift.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Gift>, DomainError> {
        let row = sqlx::query_as::<_, GiftRow>("SELECT * FROM gifts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(Gift::try_from).transpose()
    }

    async fn find_by_sender(
        &self,
        sender_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError> {
        let rows = sqlx::query_as::<_, GiftRow>(
            r#"
            SELECT * FROM gifts
            WHERE sender_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(sender_id)
        .bind(status.map(GiftStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_gifts(rows)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError> {
        let rows = sqlx::query_as::<_, GiftRow>(
            r#"
            SELECT * FROM gifts
            WHERE recipient_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient_id)
        .bind(status.map(GiftStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_gifts(rows)
    }

    async fn find_by_status(&self, status: GiftStatus) -> Result<Vec<Gift>, DomainError> {
        let rows = sqlx::query_as::<_, GiftRow>(
            "SELECT * FROM gifts WHERE status = $1 ORDER BY created_at ASC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_gifts(rows)
    }

    async fn update_if_status(
        &self,
        gift: &Gift,
        expected: GiftStatus,
    ) -> Result<bool, DomainError> {
        let selection = gift.selection.as_ref();
        let dispatch = gift.dispatch.as_ref();

        // Single conditional statement: nothing is written unless the stored
        // status is still the one the caller read
        let result = sqlx::query(
            r#"
            UPDATE gifts
            SET status = $3, delivery_address = $4, agent_reasoning = $5,
                gift_name = $6, gift_description = $7, gift_price = $8,
                gift_image_url = $9, gift_category = $10,
                platform = $11, order_id = $12, tracking_url = $13,
                ordered_at = $14, delivered_at = $15
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(gift.id)
        .bind(expected.as_str())
        .bind(gift.status.as_str())
        .bind(&gift.delivery_address)
        .bind(&gift.agent_reasoning)
        .bind(selection.map(|s| s.name.as_str()))
        .bind(selection.map(|s| s.description.as_str()))
        .bind(selection.map(|s| s.price))
        .bind(selection.map(|s| s.image_url.as_str()))
        .bind(selection.map(|s| s.category.to_string()))
        .bind(dispatch.map(|d| d.platform.as_str()))
        .bind(dispatch.map(|d| d.order_id.as_str()))
        .bind(dispatch.and_then(|d| d.tracking_url.as_deref()))
        .bind(gift.ordered_at)
        .bind(gift.delivered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM gifts WHERE id = $1)")
                .bind(gift.id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::Repository(e.to_string()))?;

        unapplied_write(gift.id, exists)
    }
}

/// Outcome of a conditional write that matched no row
fn unapplied_write(gift_id: Uuid, exists: bool) -> Result<bool, DomainError> {
    if exists {
        Ok(false)
    } else {
        Err(DomainError::not_found("Gift", gift_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_race_is_false() {
        assert!(!unapplied_write(Uuid::new_v4(), true).unwrap());
    }

    #[test]
    fn test_missing_gift_is_not_found() {
        let err = unapplied_write(Uuid::new_v4(), false).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
