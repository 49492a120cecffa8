//! GiftSubscription - Recurring rule that originates gifts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::gift::validate_budget;
use crate::domain::errors::DomainError;
use crate::domain::services::schedule;
use crate::domain::value_objects::{Frequency, TimeOfDay};

/// Message attached to gifts originated by a subscription
pub const SUBSCRIPTION_GIFT_MESSAGE: &str = "Automated gift from your subscription!";

/// GiftSubscription - schedule, gift template, and runtime state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GiftSubscription {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub frequency: Frequency,
    /// 0 = Monday .. 6 = Sunday, weekly only
    pub day_of_week: Option<u32>,
    /// 1..=31, monthly only
    pub day_of_month: Option<u32>,
    pub time_of_day: TimeOfDay,
    pub vibe_prompt: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub is_active: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
    /// Advisory only; the due rule never reads it
    pub next_send_at: Option<DateTime<Utc>>,
    pub total_gifts_sent: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a subscription
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub frequency: Frequency,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub time_of_day: TimeOfDay,
    pub vibe_prompt: String,
    pub budget_min: f64,
    pub budget_max: f64,
}

/// Partial update of a subscription's schedule or template
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPatch {
    pub is_active: Option<bool>,
    pub frequency: Option<Frequency>,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub time_of_day: Option<TimeOfDay>,
    pub vibe_prompt: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
}

impl GiftSubscription {
    /// Create a validated, active subscription
    pub fn new(request: NewSubscription, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut subscription = Self {
            id: Uuid::new_v4(),
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            frequency: request.frequency,
            day_of_week: request.day_of_week,
            day_of_month: request.day_of_month,
            time_of_day: request.time_of_day,
            vibe_prompt: request.vibe_prompt,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
            is_active: true,
            last_sent_at: None,
            next_send_at: None,
            total_gifts_sent: 0,
            created_at: now,
            updated_at: now,
        };
        subscription.validate()?;
        subscription.next_send_at = schedule::next_occurrence(&subscription, now);
        Ok(subscription)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_budget(self.budget_min, self.budget_max)?;
        if self.sender_id == self.recipient_id {
            return Err(DomainError::validation("cannot subscribe to gift yourself"));
        }
        match self.frequency {
            Frequency::Daily => {}
            Frequency::Weekly => match self.day_of_week {
                Some(day) if day <= 6 => {}
                Some(day) => {
                    return Err(DomainError::validation(format!(
                        "day_of_week must be 0-6, got {}",
                        day
                    )))
                }
                None => {
                    return Err(DomainError::validation(
                        "weekly subscriptions need day_of_week",
                    ))
                }
            },
            Frequency::Monthly => match self.day_of_month {
                Some(day) if (1..=31).contains(&day) => {}
                Some(day) => {
                    return Err(DomainError::validation(format!(
                        "day_of_month must be 1-31, got {}",
                        day
                    )))
                }
                None => {
                    return Err(DomainError::validation(
                        "monthly subscriptions need day_of_month",
                    ))
                }
            },
        }
        Ok(())
    }

    /// Apply an update, re-validating and refreshing the advisory next send
    pub fn apply(
        &mut self,
        patch: SubscriptionPatch,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut updated = self.clone();
        if let Some(is_active) = patch.is_active {
            updated.is_active = is_active;
        }
        if let Some(frequency) = patch.frequency {
            updated.frequency = frequency;
        }
        if patch.day_of_week.is_some() {
            updated.day_of_week = patch.day_of_week;
        }
        if patch.day_of_month.is_some() {
            updated.day_of_month = patch.day_of_month;
        }
        if let Some(time_of_day) = patch.time_of_day {
            updated.time_of_day = time_of_day;
        }
        if let Some(vibe_prompt) = patch.vibe_prompt {
            updated.vibe_prompt = vibe_prompt;
        }
        if let Some(budget_min) = patch.budget_min {
            updated.budget_min = budget_min;
        }
        if let Some(budget_max) = patch.budget_max {
            updated.budget_max = budget_max;
        }
        updated.validate()?;
        updated.next_send_at = if updated.is_active {
            schedule::next_occurrence(&updated, now)
        } else {
            None
        };
        updated.updated_at = now;
        *self = updated;
        Ok(())
    }

    /// Whether the subscription should originate a gift at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && schedule::is_due(self, now)
    }

    /// Record a fire at `now`. `last_sent_at` never moves backward.
    pub fn record_send(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(last) = self.last_sent_at {
            if now < last {
                return Err(DomainError::Conflict(format!(
                    "subscription {} last sent at {}, refusing to rewind to {}",
                    self.id, last, now
                )));
            }
        }
        self.last_sent_at = Some(now);
        self.total_gifts_sent += 1;
        self.next_send_at = schedule::next_occurrence(self, now);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(frequency: Frequency) -> NewSubscription {
        NewSubscription {
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            frequency,
            day_of_week: None,
            day_of_month: None,
            time_of_day: TimeOfDay::default(),
            vibe_prompt: "something sweet".to_string(),
            budget_min: 100.0,
            budget_max: 900.0,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_weekly_requires_day_of_week() {
        let err = GiftSubscription::new(request(Frequency::Weekly), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut ok = request(Frequency::Weekly);
        ok.day_of_week = Some(6);
        assert!(GiftSubscription::new(ok, Utc::now()).is_ok());

        let mut bad = request(Frequency::Weekly);
        bad.day_of_week = Some(7);
        assert!(GiftSubscription::new(bad, Utc::now()).is_err());
    }

    #[test]
    fn test_monthly_requires_day_of_month() {
        assert!(GiftSubscription::new(request(Frequency::Monthly), Utc::now()).is_err());

        let mut bad = request(Frequency::Monthly);
        bad.day_of_month = Some(0);
        assert!(GiftSubscription::new(bad, Utc::now()).is_err());

        let mut ok = request(Frequency::Monthly);
        ok.day_of_month = Some(31);
        assert!(GiftSubscription::new(ok, Utc::now()).is_ok());
    }

    #[test]
    fn test_new_computes_next_send() {
        let sub = GiftSubscription::new(request(Frequency::Daily), at(2026, 3, 2, 8)).unwrap();
        assert_eq!(sub.next_send_at, Some(at(2026, 3, 2, 10)));
        assert_eq!(sub.total_gifts_sent, 0);
        assert!(sub.is_active);
    }

    #[test]
    fn test_record_send_is_monotonic() {
        let mut sub = GiftSubscription::new(request(Frequency::Daily), at(2026, 3, 1, 0)).unwrap();
        sub.record_send(at(2026, 3, 2, 10)).unwrap();
        assert_eq!(sub.total_gifts_sent, 1);
        assert_eq!(sub.next_send_at, Some(at(2026, 3, 3, 10)));

        assert!(sub.record_send(at(2026, 3, 1, 10)).is_err());
        assert_eq!(sub.last_sent_at, Some(at(2026, 3, 2, 10)));
        assert_eq!(sub.total_gifts_sent, 1);
    }

    #[test]
    fn test_inactive_is_never_due() {
        let mut sub = GiftSubscription::new(request(Frequency::Daily), at(2026, 3, 1, 0)).unwrap();
        sub.apply(
            SubscriptionPatch {
                is_active: Some(false),
                ..SubscriptionPatch::default()
            },
            at(2026, 3, 1, 1),
        )
        .unwrap();
        assert!(!sub.is_due(at(2026, 3, 2, 10)));
        assert_eq!(sub.next_send_at, None);
    }

    #[test]
    fn test_invalid_patch_leaves_subscription_untouched() {
        let mut sub = GiftSubscription::new(request(Frequency::Daily), at(2026, 3, 1, 0)).unwrap();
        let before = sub.clone();
        let err = sub
            .apply(
                SubscriptionPatch {
                    frequency: Some(Frequency::Weekly),
                    ..SubscriptionPatch::default()
                },
                at(2026, 3, 1, 1),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(sub, before);
    }
}
