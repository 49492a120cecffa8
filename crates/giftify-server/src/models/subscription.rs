//! Subscription DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use giftify::{
    DomainError, Frequency, GiftSubscription, NewSubscription, SubscriptionPatch, TickReport,
    TimeOfDay,
};

/// Create subscription request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// daily, weekly, monthly
    pub frequency: String,
    /// 0 = Monday .. 6 = Sunday, weekly only
    pub day_of_week: Option<u32>,
    /// 1..=31, monthly only
    pub day_of_month: Option<u32>,
    /// "HH:MM", defaults to "10:00"
    pub time_of_day: Option<String>,
    pub vibe_prompt: String,
    #[serde(default)]
    pub budget_min: f64,
    pub budget_max: f64,
}

fn frequency(value: &str) -> Result<Frequency, DomainError> {
    value.parse().map_err(DomainError::Validation)
}

fn time_of_day(value: &str) -> Result<TimeOfDay, DomainError> {
    value.parse().map_err(DomainError::Validation)
}

impl TryFrom<CreateSubscriptionRequest> for NewSubscription {
    type Error = DomainError;

    fn try_from(request: CreateSubscriptionRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            frequency: frequency(&request.frequency)?,
            day_of_week: request.day_of_week,
            day_of_month: request.day_of_month,
            time_of_day: request
                .time_of_day
                .as_deref()
                .map(time_of_day)
                .transpose()?
                .unwrap_or_default(),
            vibe_prompt: request.vibe_prompt,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
        })
    }
}

/// Update subscription request; omitted fields are left unchanged
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    pub sender_id: Uuid,
    pub is_active: Option<bool>,
    pub frequency: Option<String>,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub time_of_day: Option<String>,
    pub vibe_prompt: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
}

impl TryFrom<UpdateSubscriptionRequest> for SubscriptionPatch {
    type Error = DomainError;

    fn try_from(request: UpdateSubscriptionRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            is_active: request.is_active,
            frequency: request.frequency.as_deref().map(frequency).transpose()?,
            day_of_week: request.day_of_week,
            day_of_month: request.day_of_month,
            time_of_day: request.time_of_day.as_deref().map(time_of_day).transpose()?,
            vibe_prompt: request.vibe_prompt,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
        })
    }
}

/// Identifies the acting sender
#[derive(Debug, Deserialize, IntoParams)]
pub struct SenderQuery {
    pub sender_id: Uuid,
}

/// Subscription response
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub frequency: String,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub time_of_day: String,
    pub vibe_prompt: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub is_active: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub next_send_at: Option<DateTime<Utc>>,
    pub total_gifts_sent: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GiftSubscription> for SubscriptionResponse {
    fn from(s: GiftSubscription) -> Self {
        Self {
            id: s.id,
            sender_id: s.sender_id,
            recipient_id: s.recipient_id,
            frequency: s.frequency.to_string(),
            day_of_week: s.day_of_week,
            day_of_month: s.day_of_month,
            time_of_day: s.time_of_day.to_string(),
            vibe_prompt: s.vibe_prompt,
            budget_min: s.budget_min,
            budget_max: s.budget_max,
            is_active: s.is_active,
            last_sent_at: s.last_sent_at,
            next_send_at: s.next_send_at,
            total_gifts_sent: s.total_gifts_sent,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Outcome counts of one scheduler tick
#[derive(Debug, Serialize, ToSchema)]
pub struct TickReportResponse {
    pub evaluated: usize,
    pub fired: usize,
    pub skipped_no_address: usize,
    pub failed: usize,
}

impl From<TickReport> for TickReportResponse {
    fn from(report: TickReport) -> Self {
        Self {
            evaluated: report.evaluated,
            fired: report.fired,
            skipped_no_address: report.skipped_no_address,
            failed: report.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(frequency: &str, time_of_day: Option<&str>) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            frequency: frequency.to_string(),
            day_of_week: Some(2),
            day_of_month: None,
            time_of_day: time_of_day.map(str::to_string),
            vibe_prompt: "roast them".to_string(),
            budget_min: 0.0,
            budget_max: 400.0,
        }
    }

    #[test]
    fn test_time_of_day_defaults_to_ten() {
        let request = NewSubscription::try_from(create("weekly", None)).unwrap();
        assert_eq!(request.time_of_day.to_string(), "10:00");
        assert_eq!(request.frequency, Frequency::Weekly);
    }

    #[test]
    fn test_bad_values_are_validation_errors() {
        assert!(matches!(
            NewSubscription::try_from(create("hourly", None)),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewSubscription::try_from(create("daily", Some("25:00"))),
            Err(DomainError::Validation(_))
        ));
    }
}
