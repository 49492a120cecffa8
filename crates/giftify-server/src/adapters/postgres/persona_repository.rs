//! PostgreSQL persona reader and address resolver
//!
//! Read-only view of the `user_personas` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use giftify::{AddressResolver, DomainError, PersonaHints, PersonaReader};

pub struct PgPersonaRepository {
    pool: PgPool,
}

impl PgPersonaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PersonaRow {
    gift_style: Option<String>,
    budget_preference: Option<String>,
    interests: serde_json::Value,
}

impl From<PersonaRow> for PersonaHints {
    fn from(row: PersonaRow) -> Self {
        Self {
            gift_style: row.gift_style,
            interests: serde_json::from_value(row.interests).unwrap_or_default(),
            budget_preference: row.budget_preference,
        }
    }
}

#[async_trait]
impl PersonaReader for PgPersonaRepository {
    async fn get_persona(&self, recipient_id: Uuid) -> Result<Option<PersonaHints>, DomainError> {
        let row = sqlx::query_as::<_, PersonaRow>(
            "SELECT gift_style, budget_preference, interests FROM user_personas WHERE user_id = $1",
        )
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl AddressResolver for PgPersonaRepository {
    async fn get_delivery_address(
        &self,
        recipient_id: Uuid,
    ) -> Result<Option<String>, DomainError> {
        let address = sqlx::query_scalar::<_, Option<String>>(
            "SELECT default_address FROM user_personas WHERE user_id = $1",
        )
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(address.flatten().filter(|a| !a.trim().is_empty()))
    }
}
