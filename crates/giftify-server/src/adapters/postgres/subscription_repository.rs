//! PostgreSQL implementation of SubscriptionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use giftify::{DomainError, GiftSubscription, SubscriptionRepository};

/// PostgreSQL implementation of SubscriptionRepository
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    frequency: String,
    day_of_week: Option<i32>,
    day_of_month: Option<i32>,
    time_of_day: String,
    vibe_prompt: String,
    budget_min: f64,
    budget_max: f64,
    is_active: bool,
    last_sent_at: Option<DateTime<Utc>>,
    next_send_at: Option<DateTime<Utc>>,
    total_gifts_sent: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn day(value: Option<i32>) -> Result<Option<u32>, DomainError> {
    value
        .map(|v| u32::try_from(v).map_err(|e| DomainError::Repository(e.to_string())))
        .transpose()
}

impl TryFrom<SubscriptionRow> for GiftSubscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            frequency: row.frequency.parse().map_err(DomainError::Repository)?,
            day_of_week: day(row.day_of_week)?,
            day_of_month: day(row.day_of_month)?,
            time_of_day: row.time_of_day.parse().map_err(DomainError::Repository)?,
            vibe_prompt: row.vibe_prompt,
            budget_min: row.budget_min,
            budget_max: row.budget_max,
            is_active: row.is_active,
            last_sent_at: row.last_sent_at,
            next_send_at: row.next_send_at,
            total_gifts_sent: row.total_gifts_sent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_subscriptions(rows: Vec<SubscriptionRow>) -> Result<Vec<GiftSubscription>, DomainError> {
    rows.into_iter().map(GiftSubscription::try_from).collect()
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(
        &self,
        subscription: &GiftSubscription,
    ) -> Result<GiftSubscription, DomainError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO gift_subscriptions (id, sender_id, recipient_id, frequency, day_of_week,
                                            day_of_month, time_of_day, vibe_prompt, budget_min,
                                            budget_max, is_active, next_send_at, created_at,
                                            updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.sender_id)
        .bind(subscription.recipient_id)
        .bind(subscription.frequency.to_string())
        .bind(subscription.day_of_week.map(|d| d as i32))
        .bind(subscription.day_of_month.map(|d| d as i32))
        .bind(subscription.time_of_day.to_string())
        .bind(&subscription.vibe_prompt)
        .bind(subscription.budget_min)
        .bind(subscription.budget_max)
        .bind(subscription.is_active)
        .bind(subscription.next_send_at)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GiftSubscription>, DomainError> {
        let row =
            sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM gift_subscriptions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(GiftSubscription::try_from).transpose()
    }

    async fn find_by_sender(&self, sender_id: Uuid) -> Result<Vec<GiftSubscription>, DomainError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM gift_subscriptions WHERE sender_id = $1 ORDER BY created_at DESC",
        )
        .bind(sender_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_subscriptions(rows)
    }

    async fn find_active(&self) -> Result<Vec<GiftSubscription>, DomainError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM gift_subscriptions WHERE is_active = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_subscriptions(rows)
    }

    async fn save(&self, subscription: &GiftSubscription) -> Result<GiftSubscription, DomainError> {
        // last_sent_at and total_gifts_sent belong to the scheduler
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            UPDATE gift_subscriptions
            SET frequency = $2, day_of_week = $3, day_of_month = $4, time_of_day = $5,
                vibe_prompt = $6, budget_min = $7, budget_max = $8, is_active = $9,
                next_send_at = $10, updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.frequency.to_string())
        .bind(subscription.day_of_week.map(|d| d as i32))
        .bind(subscription.day_of_month.map(|d| d as i32))
        .bind(subscription.time_of_day.to_string())
        .bind(&subscription.vibe_prompt)
        .bind(subscription.budget_min)
        .bind(subscription.budget_max)
        .bind(subscription.is_active)
        .bind(subscription.next_send_at)
        .bind(subscription.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("GiftSubscription", subscription.id))?;

        row.try_into()
    }

    async fn record_send(
        &self,
        subscription: &GiftSubscription,
        previous_last_sent: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE gift_subscriptions
            SET last_sent_at = $3, next_send_at = $4, total_gifts_sent = $5, updated_at = $6
            WHERE id = $1 AND last_sent_at IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(subscription.id)
        .bind(previous_last_sent)
        .bind(subscription.last_sent_at)
        .bind(subscription.next_send_at)
        .bind(subscription.total_gifts_sent)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
