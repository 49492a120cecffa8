//! Shared wiring for application-layer unit tests

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::gift_service::GiftService;
use super::worker::{GiftQueue, GiftWorker, WorkerConfig};
use crate::adapters::{
    InMemoryGiftRepository, InMemoryPersonaStore, ManualClock, ScriptedConnector, SeededRandom,
};
use crate::domain::services::{DeliveryDispatcher, DispatcherConfig, SelectionEngine};
use crate::domain::{DeliveryPlatform, Gift, GiftStatus, NewGift};
use crate::ports::PlatformConnector;

pub(crate) struct Harness {
    pub gifts: Arc<GiftService>,
    pub repo: Arc<InMemoryGiftRepository>,
    pub personas: Arc<InMemoryPersonaStore>,
    pub clock: Arc<ManualClock>,
    pub sender: Uuid,
    pub recipient: Uuid,
}

impl Harness {
    pub const DEFAULT_ADDRESS: &'static str = "42 Residency Road, Bengaluru";

    /// Blinkit fails, Zepto succeeds
    pub async fn new() -> Self {
        Self::with_connectors(vec![
            Arc::new(ScriptedConnector::failing(
                DeliveryPlatform::Blinkit,
                "Product currently unavailable in your area",
            )),
            Arc::new(ScriptedConnector::succeeding(DeliveryPlatform::Zepto)),
        ])
        .await
    }

    pub async fn with_connectors(connectors: Vec<Arc<dyn PlatformConnector>>) -> Self {
        let repo = Arc::new(InMemoryGiftRepository::new());
        let personas = Arc::new(InMemoryPersonaStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        ));
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        personas.set_address(recipient, Self::DEFAULT_ADDRESS).await;

        let (queue, jobs) = GiftQueue::channel();
        let gifts = Arc::new(GiftService::new(
            repo.clone(),
            personas.clone(),
            personas.clone(),
            SelectionEngine::new(Arc::new(SeededRandom::new(1))),
            DeliveryDispatcher::new(
                connectors,
                DispatcherConfig {
                    attempt_timeout: Duration::from_secs(1),
                    quantity: 1,
                },
            ),
            clock.clone(),
            queue,
        ));
        GiftWorker::new(gifts.clone(), jobs, WorkerConfig::default()).start();

        Self {
            gifts,
            repo,
            personas,
            clock,
            sender,
            recipient,
        }
    }

    pub fn surprise_request(&self) -> NewGift {
        NewGift {
            sender_id: self.sender,
            recipient_id: self.recipient,
            vibe_prompt: "send something chaotic".to_string(),
            budget_min: 200.0,
            budget_max: 500.0,
            is_surprise: true,
            delivery_address: Some("221B Baker Street".to_string()),
            sender_message: Some("enjoy".to_string()),
        }
    }

    pub fn approval_request(&self) -> NewGift {
        NewGift {
            is_surprise: false,
            budget_max: 2000.0,
            ..self.surprise_request()
        }
    }

    /// A freshly picked gift waiting for the sender
    pub async fn awaiting_approval(&self) -> Gift {
        let submission = self
            .gifts
            .create_gift(self.approval_request())
            .await
            .unwrap();
        let gift = submission.ticket.unwrap().wait().await.unwrap();
        assert_eq!(gift.status, GiftStatus::AwaitingApproval);
        gift
    }
}
