//! Subscription schedule rules
//!
//! `is_due` decides firing; `next_occurrence` only feeds the advisory
//! `next_send_at`. The weekly gap is measured in elapsed time, not in
//! calendar days.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};

use crate::domain::entities::GiftSubscription;
use crate::domain::value_objects::Frequency;

/// Due rule evaluated at `now` (ignores `is_active`)
pub fn is_due(subscription: &GiftSubscription, now: DateTime<Utc>) -> bool {
    if now.hour() != subscription.time_of_day.hour() {
        return false;
    }

    let last = subscription.last_sent_at;
    match subscription.frequency {
        Frequency::Daily => last.map_or(true, |last| last.date_naive() != now.date_naive()),
        Frequency::Weekly => {
            let Some(day_of_week) = subscription.day_of_week else {
                return false;
            };
            if now.weekday().num_days_from_monday() != day_of_week {
                return false;
            }
            last.map_or(true, |last| now - last >= Duration::days(7))
        }
        Frequency::Monthly => {
            let Some(day_of_month) = subscription.day_of_month else {
                return false;
            };
            if now.day() != day_of_month {
                return false;
            }
            last.map_or(true, |last| {
                (last.year(), last.month()) != (now.year(), now.month())
            })
        }
    }
}

/// First scheduled instant strictly after `after`
pub fn next_occurrence(
    subscription: &GiftSubscription,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(
        subscription.time_of_day.hour(),
        subscription.time_of_day.minute(),
        0,
    )?;
    let start = after.date_naive();
    let at = |date: NaiveDate| date.and_time(time).and_utc();

    match subscription.frequency {
        Frequency::Daily => (0..=1)
            .filter_map(|offset| start.checked_add_days(Days::new(offset)))
            .map(at)
            .find(|candidate| *candidate > after),
        Frequency::Weekly => {
            let day_of_week = subscription.day_of_week?;
            (0..=7)
                .filter_map(|offset| start.checked_add_days(Days::new(offset)))
                .filter(|date| date.weekday().num_days_from_monday() == day_of_week)
                .map(at)
                .find(|candidate| *candidate > after)
        }
        Frequency::Monthly => {
            let day_of_month = subscription.day_of_month?;
            let first = start.with_day(1)?;
            // Day 31 recurs at least every other month; a year covers every case
            (0..=12)
                .filter_map(|offset| first.checked_add_months(Months::new(offset)))
                .filter_map(|month| month.with_day(day_of_month))
                .map(at)
                .find(|candidate| *candidate > after)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::TimeOfDay;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn subscription(frequency: Frequency) -> GiftSubscription {
        let now = Utc::now();
        GiftSubscription {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            frequency,
            day_of_week: None,
            day_of_month: None,
            time_of_day: TimeOfDay::new(10, 0).unwrap(),
            vibe_prompt: "something chaotic".to_string(),
            budget_min: 0.0,
            budget_max: 1000.0,
            is_active: true,
            last_sent_at: None,
            next_send_at: None,
            total_gifts_sent: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_wrong_hour_never_due() {
        let sub = subscription(Frequency::Daily);
        assert!(!is_due(&sub, at(2026, 3, 3, 9, 59)));
        assert!(is_due(&sub, at(2026, 3, 3, 10, 0)));
        assert!(is_due(&sub, at(2026, 3, 3, 10, 59)));
        assert!(!is_due(&sub, at(2026, 3, 3, 11, 0)));
    }

    #[test]
    fn test_daily_not_twice_same_day() {
        let mut sub = subscription(Frequency::Daily);
        sub.last_sent_at = Some(at(2026, 3, 3, 10, 5));
        assert!(!is_due(&sub, at(2026, 3, 3, 10, 30)));
        assert!(!is_due(&sub, at(2026, 3, 3, 10, 55)));
        assert!(is_due(&sub, at(2026, 3, 4, 10, 5)));
    }

    #[test]
    fn test_weekly_needs_matching_weekday() {
        let mut sub = subscription(Frequency::Weekly);
        sub.day_of_week = Some(2); // Wednesday
        // 2026-03-04 is a Wednesday
        assert!(is_due(&sub, at(2026, 3, 4, 10, 0)));
        assert!(!is_due(&sub, at(2026, 3, 5, 10, 0)));
    }

    #[test]
    fn test_weekly_six_days_is_too_soon() {
        let mut sub = subscription(Frequency::Weekly);
        sub.day_of_week = Some(2);
        let now = at(2026, 3, 4, 10, 0);

        sub.last_sent_at = Some(now - Duration::days(6));
        assert!(!is_due(&sub, now));

        sub.last_sent_at = Some(now - Duration::days(7));
        assert!(is_due(&sub, now));
    }

    #[test]
    fn test_weekly_counts_elapsed_time() {
        let mut sub = subscription(Frequency::Weekly);
        sub.day_of_week = Some(2);
        sub.last_sent_at = Some(at(2026, 2, 25, 10, 30));
        // Same weekday and hour, three minutes short of a full week
        assert!(!is_due(&sub, at(2026, 3, 4, 10, 27)));
        assert!(is_due(&sub, at(2026, 3, 4, 10, 30)));
    }

    #[test]
    fn test_monthly_once_per_month() {
        let mut sub = subscription(Frequency::Monthly);
        sub.day_of_month = Some(15);
        assert!(is_due(&sub, at(2026, 3, 15, 10, 0)));
        assert!(!is_due(&sub, at(2026, 3, 16, 10, 0)));

        sub.last_sent_at = Some(at(2026, 3, 15, 10, 1));
        assert!(!is_due(&sub, at(2026, 3, 15, 10, 40)));
        assert!(is_due(&sub, at(2026, 4, 15, 10, 0)));
    }

    #[test]
    fn test_missing_day_fields_never_due() {
        assert!(!is_due(&subscription(Frequency::Weekly), at(2026, 3, 4, 10, 0)));
        assert!(!is_due(&subscription(Frequency::Monthly), at(2026, 3, 4, 10, 0)));
    }

    #[test]
    fn test_next_daily() {
        let sub = subscription(Frequency::Daily);
        assert_eq!(
            next_occurrence(&sub, at(2026, 3, 3, 9, 0)),
            Some(at(2026, 3, 3, 10, 0))
        );
        assert_eq!(
            next_occurrence(&sub, at(2026, 3, 3, 10, 0)),
            Some(at(2026, 3, 4, 10, 0))
        );
    }

    #[test]
    fn test_next_weekly() {
        let mut sub = subscription(Frequency::Weekly);
        sub.day_of_week = Some(0); // Monday
        // 2026-03-04 (Wed) -> 2026-03-09 (Mon)
        assert_eq!(
            next_occurrence(&sub, at(2026, 3, 4, 12, 0)),
            Some(at(2026, 3, 9, 10, 0))
        );
        // Fired on Monday 10:15 -> next Monday
        assert_eq!(
            next_occurrence(&sub, at(2026, 3, 9, 10, 15)),
            Some(at(2026, 3, 16, 10, 0))
        );
    }

    #[test]
    fn test_next_monthly_skips_short_months() {
        let mut sub = subscription(Frequency::Monthly);
        sub.day_of_month = Some(31);
        assert_eq!(
            next_occurrence(&sub, at(2026, 1, 31, 11, 0)),
            Some(at(2026, 3, 31, 10, 0))
        );
    }

    #[test]
    fn test_next_monthly_rolls_over_year() {
        let mut sub = subscription(Frequency::Monthly);
        sub.day_of_month = Some(5);
        assert_eq!(
            next_occurrence(&sub, at(2026, 12, 20, 0, 0)),
            Some(at(2027, 1, 5, 10, 0))
        );
    }
}
