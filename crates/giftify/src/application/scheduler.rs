//! Subscription Scheduler - Periodic origination of subscription gifts
//!
//! Each tick evaluates every active subscription against the due rule.
//! A due subscription is marked sent (conditionally on the `last_sent_at`
//! observed at the start of the tick) before its gift is created, so a crash
//! in between costs one cycle instead of sending twice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::gift_service::GiftService;
use crate::domain::{DomainError, GiftSubscription, NewGift, SUBSCRIPTION_GIFT_MESSAGE};
use crate::ports::{AddressResolver, Clock, SubscriptionRepository};

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between ticks
    pub interval: Duration,
    /// Delay before the first tick after startup
    pub startup_delay: Duration,
    /// Enable/disable scheduler
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600), // 1 hour
            startup_delay: Duration::from_secs(10),
            enabled: true,
        }
    }
}

/// Outcome counts of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Active subscriptions looked at
    pub evaluated: usize,
    /// Gifts originated
    pub fired: usize,
    /// Due, but the recipient has no delivery address
    pub skipped_no_address: usize,
    /// Due, but processing failed
    pub failed: usize,
}

/// Another tick is still running
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("a scheduler tick is already running")]
pub struct TickInProgress;

enum FireOutcome {
    Fired,
    NoAddress,
    /// Someone else recorded a send since the tick read the subscription
    AlreadySent,
}

pub struct SubscriptionScheduler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    addresses: Arc<dyn AddressResolver>,
    gifts: Arc<GiftService>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    running: AtomicBool,
}

impl SubscriptionScheduler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        addresses: Arc<dyn AddressResolver>,
        gifts: Arc<GiftService>,
        clock: Arc<dyn Clock>,
        config: Option<SchedulerConfig>,
    ) -> Self {
        Self {
            subscriptions,
            addresses,
            gifts,
            clock,
            config: config.unwrap_or_default(),
            running: AtomicBool::new(false),
        }
    }

    /// Start the scheduler (runs in background)
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        if !self.config.enabled {
            tracing::info!("📅 Subscription scheduler disabled");
            return;
        }

        tracing::info!(
            "📅 Subscription scheduler started (interval: {:?}, first check in {:?})",
            self.config.interval,
            self.config.startup_delay
        );

        let mut ticker = interval_at(
            Instant::now() + self.config.startup_delay,
            self.config.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.tick().await {
                Ok(report) => tracing::info!(
                    "🔄 Scheduler: tick completed ({} evaluated, {} fired, {} without address, {} failed)",
                    report.evaluated,
                    report.fired,
                    report.skipped_no_address,
                    report.failed
                ),
                Err(e) => tracing::warn!("⏭️ Scheduler: {}, skipping", e),
            }
        }
    }

    /// Evaluate every active subscription once. Overlapping calls are refused.
    pub async fn tick(&self) -> Result<TickReport, TickInProgress> {
        let _guard = TickGuard::acquire(&self.running).ok_or(TickInProgress)?;
        let now = self.clock.now();
        let mut report = TickReport::default();

        let active = match self.subscriptions.find_active().await {
            Ok(active) => active,
            Err(e) => {
                tracing::error!("Scheduler: could not load subscriptions: {}", e);
                return Ok(report);
            }
        };

        for subscription in active {
            report.evaluated += 1;
            if !subscription.is_due(now) {
                continue;
            }

            match self.fire(&subscription, now).await {
                Ok(FireOutcome::Fired) => report.fired += 1,
                Ok(FireOutcome::NoAddress) => report.skipped_no_address += 1,
                Ok(FireOutcome::AlreadySent) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        subscription_id = %subscription.id,
                        "❌ Subscription failed to fire: {}",
                        e
                    );
                }
            }
        }

        Ok(report)
    }

    async fn fire(
        &self,
        subscription: &GiftSubscription,
        now: DateTime<Utc>,
    ) -> Result<FireOutcome, DomainError> {
        let Some(address) = self
            .addresses
            .get_delivery_address(subscription.recipient_id)
            .await?
        else {
            tracing::warn!(
                subscription_id = %subscription.id,
                "Recipient {} has no delivery address, skipping",
                subscription.recipient_id
            );
            return Ok(FireOutcome::NoAddress);
        };

        let request = NewGift {
            sender_id: subscription.sender_id,
            recipient_id: subscription.recipient_id,
            vibe_prompt: subscription.vibe_prompt.clone(),
            budget_min: subscription.budget_min,
            budget_max: subscription.budget_max,
            is_surprise: true,
            delivery_address: Some(address),
            sender_message: Some(SUBSCRIPTION_GIFT_MESSAGE.to_string()),
        };
        // A request that can never become a gift must not count as sent
        request.validate()?;

        let previous = subscription.last_sent_at;
        let mut sent = subscription.clone();
        sent.record_send(now)?;
        if !self.subscriptions.record_send(&sent, previous).await? {
            tracing::warn!(
                subscription_id = %subscription.id,
                "Subscription already sent by another tick"
            );
            return Ok(FireOutcome::AlreadySent);
        }

        let submission = self.gifts.create_gift(request).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            gift_id = %submission.gift.id,
            "📬 Subscription fired ({} {} gifts sent)",
            sent.total_gifts_sent,
            subscription.frequency
        );
        Ok(FireOutcome::Fired)
    }
}

struct TickGuard<'a>(&'a AtomicBool);

impl<'a> TickGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySubscriptionRepository;
    use crate::application::test_support::Harness;
    use crate::domain::{Frequency, GiftStatus, NewSubscription, TimeOfDay};
    use chrono::TimeZone;

    struct Fixture {
        harness: Harness,
        repo: Arc<InMemorySubscriptionRepository>,
        scheduler: SubscriptionScheduler,
    }

    async fn fixture() -> Fixture {
        let harness = Harness::new().await;
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let scheduler = SubscriptionScheduler::new(
            repo.clone(),
            harness.personas.clone(),
            harness.gifts.clone(),
            harness.clock.clone(),
            None,
        );
        Fixture {
            harness,
            repo,
            scheduler,
        }
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    async fn subscribe(
        f: &Fixture,
        frequency: Frequency,
        recipient: uuid::Uuid,
    ) -> GiftSubscription {
        let subscription = GiftSubscription::new(
            NewSubscription {
                sender_id: f.harness.sender,
                recipient_id: recipient,
                frequency,
                // 2026-03-04 is a Wednesday
                day_of_week: Some(2),
                day_of_month: Some(4),
                time_of_day: TimeOfDay::default(),
                vibe_prompt: "something chaotic".to_string(),
                budget_min: 200.0,
                budget_max: 500.0,
            },
            at(1, 0, 0),
        )
        .unwrap();
        f.repo.create(&subscription).await.unwrap()
    }

    #[tokio::test]
    async fn test_daily_fires_once_per_day() {
        let f = fixture().await;
        let sub = subscribe(&f, Frequency::Daily, f.harness.recipient).await;

        f.harness.clock.set(at(2, 10, 0));
        let first = f.scheduler.tick().await.unwrap();
        assert_eq!(first.fired, 1);

        f.harness.clock.set(at(2, 10, 30));
        let second = f.scheduler.tick().await.unwrap();
        assert_eq!(second.evaluated, 1);
        assert_eq!(second.fired, 0);

        let stored = f.repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.total_gifts_sent, 1);
        assert_eq!(stored.last_sent_at, Some(at(2, 10, 0)));
        assert_eq!(stored.next_send_at, Some(at(3, 10, 0)));

        let gifts = f.harness.repo.all().await;
        assert_eq!(gifts.len(), 1);
        assert!(gifts[0].is_surprise);
        assert_eq!(gifts[0].sender_message.as_deref(), Some(SUBSCRIPTION_GIFT_MESSAGE));
        assert_eq!(
            gifts[0].delivery_address.as_deref(),
            Some(Harness::DEFAULT_ADDRESS)
        );
    }

    #[tokio::test]
    async fn test_wrong_hour_does_not_fire() {
        let f = fixture().await;
        subscribe(&f, Frequency::Daily, f.harness.recipient).await;

        f.harness.clock.set(at(2, 11, 0));
        let report = f.scheduler.tick().await.unwrap();
        assert_eq!(report, TickReport {
            evaluated: 1,
            ..TickReport::default()
        });
    }

    #[tokio::test]
    async fn test_no_address_skips_without_mutation() {
        let f = fixture().await;
        let sub = subscribe(&f, Frequency::Daily, uuid::Uuid::new_v4()).await;

        f.harness.clock.set(at(2, 10, 0));
        let report = f.scheduler.tick().await.unwrap();
        assert_eq!(report.skipped_no_address, 1);
        assert_eq!(report.fired, 0);

        let stored = f.repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.last_sent_at, None);
        assert_eq!(stored.total_gifts_sent, 0);
        assert!(f.harness.repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_tick() {
        let f = fixture().await;
        // Invalid budget slips past validation by being written directly
        let mut broken = subscribe(&f, Frequency::Daily, f.harness.recipient).await;
        broken.id = uuid::Uuid::new_v4();
        broken.budget_min = 900.0;
        broken.budget_max = 100.0;
        f.repo.create(&broken).await.unwrap();
        subscribe(&f, Frequency::Daily, f.harness.recipient).await;

        f.harness.clock.set(at(2, 10, 0));
        let report = f.scheduler.tick().await.unwrap();
        assert_eq!(report.evaluated, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.fired, 2);

        let stored = f.repo.find_by_id(broken.id).await.unwrap().unwrap();
        assert_eq!(stored.total_gifts_sent, 0);
        assert_eq!(stored.last_sent_at, None);
    }

    #[tokio::test]
    async fn test_invalid_subscription_never_counts_as_sent() {
        let f = fixture().await;
        let mut broken = subscribe(&f, Frequency::Daily, f.harness.recipient).await;
        broken.budget_min = 900.0;
        broken.budget_max = 100.0;
        // Bypass the service so the repository keeps the bad budget
        let broken = f.repo.save(&broken).await.unwrap();

        for day in 2..=4 {
            f.harness.clock.set(at(day, 10, 0));
            let report = f.scheduler.tick().await.unwrap();
            assert_eq!(report.failed, 1);
            assert_eq!(report.fired, 0);
        }

        let stored = f.repo.find_by_id(broken.id).await.unwrap().unwrap();
        assert_eq!(stored.total_gifts_sent, 0);
        assert!(f.harness.repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_weekly_respects_seven_days() {
        let f = fixture().await;
        let sub = subscribe(&f, Frequency::Weekly, f.harness.recipient).await;

        f.harness.clock.set(at(4, 10, 0));
        assert_eq!(f.scheduler.tick().await.unwrap().fired, 1);

        f.harness.clock.set(at(11, 10, 0));
        assert_eq!(f.scheduler.tick().await.unwrap().fired, 1);

        let stored = f.repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.total_gifts_sent, 2);
        assert_eq!(stored.next_send_at, Some(at(18, 10, 0)));
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_refused() {
        let f = fixture().await;
        let _held = TickGuard::acquire(&f.scheduler.running).unwrap();
        assert_eq!(f.scheduler.tick().await, Err(TickInProgress));
    }

    #[tokio::test]
    async fn test_subscription_gift_ships() {
        let f = fixture().await;
        subscribe(&f, Frequency::Monthly, f.harness.recipient).await;

        f.harness.clock.set(at(4, 10, 5));
        assert_eq!(f.scheduler.tick().await.unwrap().fired, 1);

        let gift = f.harness.repo.all().await.remove(0);
        let gift = loop {
            let current = f.harness.gifts.get_gift(gift.id).await.unwrap();
            if current.status.is_terminal() || current.status == GiftStatus::Shipped {
                break current;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(gift.status, GiftStatus::Shipped);
    }
}
