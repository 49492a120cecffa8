//! Gift Application Service (Use Case)
//!
//! Drives gifts through the state machine. Every status write is a
//! compare-and-set against the status the gift was read in, so two writers
//! can never both advance the same gift. Selection and dispatch run outside
//! any lock; only the final write is guarded.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::worker::{GiftJob, GiftQueue, JobTicket};
use crate::domain::services::{DeliveryDispatcher, SelectionEngine, NO_SUITABLE_ITEM_REASON};
use crate::domain::{DomainError, Gift, GiftStatus, NewGift};
use crate::ports::{AddressResolver, Clock, GiftRepository, PersonaReader};

/// Reasoning recorded on a gift cancelled because it has nowhere to go
pub const NO_DELIVERY_ADDRESS_REASON: &str = "no delivery address";

/// Reasoning prefix on a gift cancelled because its pick could not be stored
pub const PICK_NOT_SAVED_REASON: &str = "selection could not be saved";

const DEFAULT_SURPRISE_VIBE: &str = "something chaotic and fun";

/// Gift as persisted, plus the background job that continues it (if any)
#[derive(Debug)]
pub struct Submission {
    pub gift: Gift,
    pub ticket: Option<JobTicket>,
}

/// Outcome of the startup sweep over gifts a previous process left mid-flight
#[derive(Debug, Default)]
pub struct Recovery {
    /// Pick jobs queued again for gifts found in AGENT_PICKING
    pub requeued: Vec<JobTicket>,
    /// ORDERED gifts with no recorded dispatch. An order may or may not have
    /// been placed, so they are left for manual handling.
    pub needs_attention: Vec<Uuid>,
}

/// Quick surprise request; only the maximum budget is required
#[derive(Debug, Clone)]
pub struct SurpriseRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub budget_max: f64,
    pub budget_min: Option<f64>,
    pub vibe_prompt: Option<String>,
    pub sender_message: Option<String>,
}

/// Application service for gift operations
pub struct GiftService {
    gifts: Arc<dyn GiftRepository>,
    personas: Arc<dyn PersonaReader>,
    addresses: Arc<dyn AddressResolver>,
    selection: SelectionEngine,
    dispatcher: DeliveryDispatcher,
    clock: Arc<dyn Clock>,
    queue: GiftQueue,
    dispatching: InFlight,
}

impl GiftService {
    pub fn new(
        gifts: Arc<dyn GiftRepository>,
        personas: Arc<dyn PersonaReader>,
        addresses: Arc<dyn AddressResolver>,
        selection: SelectionEngine,
        dispatcher: DeliveryDispatcher,
        clock: Arc<dyn Clock>,
        queue: GiftQueue,
    ) -> Self {
        Self {
            gifts,
            personas,
            addresses,
            selection,
            dispatcher,
            clock,
            queue,
            dispatching: InFlight::default(),
        }
    }

    /// Create a gift and hand it to the worker for selection
    pub async fn create_gift(&self, request: NewGift) -> Result<Submission, DomainError> {
        request.validate()?;

        let mut request = request;
        if request
            .delivery_address
            .as_deref()
            .map_or(true, |a| a.trim().is_empty())
        {
            request.delivery_address = self
                .addresses
                .get_delivery_address(request.recipient_id)
                .await?;
        }

        let mut gift = Gift::new(request, self.clock.now());
        if gift.is_surprise && gift.delivery_address.is_none() {
            return Err(DomainError::validation(
                "surprise gifts need a delivery address and the recipient has none",
            ));
        }

        gift.start_picking()?;
        let saved = self.gifts.create(&gift).await?;

        tracing::info!(
            gift_id = %saved.id,
            "🎁 Created gift from {} to {} (surprise: {})",
            saved.sender_id,
            saved.recipient_id,
            saved.is_surprise
        );

        let ticket = self.queue.submit(GiftJob::Pick(saved.id))?;
        Ok(Submission {
            gift: saved,
            ticket: Some(ticket),
        })
    }

    /// Surprise gift to the recipient's default address
    pub async fn surprise(&self, request: SurpriseRequest) -> Result<Submission, DomainError> {
        let address = self
            .addresses
            .get_delivery_address(request.recipient_id)
            .await?
            .ok_or_else(|| DomainError::validation("recipient has no default delivery address"))?;

        self.create_gift(NewGift {
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            vibe_prompt: request
                .vibe_prompt
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SURPRISE_VIBE.to_string()),
            budget_min: request.budget_min.unwrap_or(0.0),
            budget_max: request.budget_max,
            is_surprise: true,
            delivery_address: Some(address),
            sender_message: request.sender_message,
        })
        .await
    }

    pub async fn get_gift(&self, id: Uuid) -> Result<Gift, DomainError> {
        self.gifts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Gift", id))
    }

    /// Gifts sent by a user, newest first
    pub async fn list_sent(
        &self,
        sender_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError> {
        self.gifts.find_by_sender(sender_id, status).await
    }

    /// Gifts received by a user, newest first
    pub async fn list_received(
        &self,
        recipient_id: Uuid,
        status: Option<GiftStatus>,
    ) -> Result<Vec<Gift>, DomainError> {
        self.gifts.find_by_recipient(recipient_id, status).await
    }

    /// Sender's decision on a gift awaiting approval
    pub async fn approve(
        &self,
        gift_id: Uuid,
        sender_id: Uuid,
        approved: bool,
    ) -> Result<Submission, DomainError> {
        let mut gift = self.get_gift(gift_id).await?;
        if gift.sender_id != sender_id {
            return Err(DomainError::Forbidden(format!(
                "only the sender of gift {} can approve it",
                gift_id
            )));
        }

        let expected = gift.status;
        if approved {
            gift.approve(self.clock.now())?;
        } else {
            gift.reject()?;
        }
        self.write(&gift, expected).await?;

        if !approved {
            tracing::info!(gift_id = %gift.id, "🚫 Gift rejected by sender");
            return Ok(Submission { gift, ticket: None });
        }

        tracing::info!(gift_id = %gift.id, "👍 Gift approved, dispatching");
        let ticket = self.queue.submit(GiftJob::Dispatch(gift.id))?;
        Ok(Submission {
            gift,
            ticket: Some(ticket),
        })
    }

    /// External cancellation. A dispatch already in flight is allowed to finish.
    pub async fn cancel(&self, gift_id: Uuid, reason: &str) -> Result<Gift, DomainError> {
        let mut gift = self.get_gift(gift_id).await?;
        let expected = gift.status;
        gift.cancel(reason)?;
        self.write(&gift, expected).await?;
        tracing::info!(gift_id = %gift.id, "🛑 Gift cancelled from {}: {}", expected, reason);
        Ok(gift)
    }

    /// Delivery confirmation signal
    pub async fn mark_delivered(&self, gift_id: Uuid) -> Result<Gift, DomainError> {
        let mut gift = self.get_gift(gift_id).await?;
        gift.mark_delivered(self.clock.now())?;
        self.write(&gift, GiftStatus::Shipped).await?;
        tracing::info!(gift_id = %gift.id, "🏁 Gift delivered");
        Ok(gift)
    }

    /// Run one background job to completion
    pub async fn process(&self, job: GiftJob) -> Result<Gift, DomainError> {
        match job {
            GiftJob::Pick(id) => {
                let gift = match self.pick(id).await {
                    Ok(gift) => gift,
                    Err(e) if e.is_conflict() => return Err(e),
                    Err(e) => return self.abandon_pick(id, e).await,
                };
                if gift.status == GiftStatus::Ordered {
                    self.dispatch(id).await
                } else {
                    Ok(gift)
                }
            }
            GiftJob::Dispatch(id) => self.dispatch(id).await,
        }
    }

    /// Cancel a gift whose pick failed, recording why.
    ///
    /// If even the cancellation cannot be stored the gift stays in
    /// AGENT_PICKING and `recover` picks it up on the next start.
    async fn abandon_pick(&self, gift_id: Uuid, cause: DomainError) -> Result<Gift, DomainError> {
        tracing::error!(gift_id = %gift_id, "❌ Pick failed, cancelling gift: {}", cause);

        let mut gift = match self.get_gift(gift_id).await {
            Ok(gift) if gift.status == GiftStatus::AgentPicking => gift,
            _ => return Err(cause),
        };
        gift.cancel(&format!("{}: {}", PICK_NOT_SAVED_REASON, cause))?;

        match self.write(&gift, GiftStatus::AgentPicking).await {
            Ok(()) => {
                tracing::warn!(
                    gift_id = %gift.id,
                    "🛑 Gift cancelled: {}",
                    PICK_NOT_SAVED_REASON
                );
                Ok(gift)
            }
            Err(e) => {
                tracing::error!(
                    gift_id = %gift_id,
                    "Could not cancel gift, left in agent_picking for recovery: {}",
                    e
                );
                Err(cause)
            }
        }
    }

    /// Startup sweep: queue picks again for AGENT_PICKING gifts and report
    /// ORDERED gifts, which are never dispatched a second time.
    pub async fn recover(&self) -> Result<Recovery, DomainError> {
        let mut recovery = Recovery::default();

        for gift in self.gifts.find_by_status(GiftStatus::AgentPicking).await? {
            tracing::info!(gift_id = %gift.id, "♻️ Re-queueing pick");
            recovery
                .requeued
                .push(self.queue.submit(GiftJob::Pick(gift.id))?);
        }

        for gift in self.gifts.find_by_status(GiftStatus::Ordered).await? {
            tracing::error!(
                gift_id = %gift.id,
                "Gift is ordered but has no dispatch record; needs manual handling"
            );
            recovery.needs_attention.push(gift.id);
        }

        Ok(recovery)
    }

    /// AGENT_PICKING -> AWAITING_APPROVAL | ORDERED | CANCELLED
    pub async fn pick(&self, gift_id: Uuid) -> Result<Gift, DomainError> {
        let mut gift = self.get_gift(gift_id).await?;
        if gift.status != GiftStatus::AgentPicking {
            return Err(DomainError::Conflict(format!(
                "gift {} is {}, not agent_picking",
                gift.id, gift.status
            )));
        }

        let persona = match self.personas.get_persona(gift.recipient_id).await {
            Ok(persona) => persona,
            Err(e) => {
                tracing::warn!(
                    gift_id = %gift.id,
                    "Persona lookup failed, picking without it: {}",
                    e
                );
                None
            }
        };

        match self.selection.select(
            &gift.vibe_prompt,
            persona.as_ref(),
            gift.budget_min,
            gift.budget_max,
        ) {
            Ok(pick) => {
                let name = pick.selection.name.clone();
                gift.record_selection(pick.selection, pick.reasoning, self.clock.now())?;
                self.write(&gift, GiftStatus::AgentPicking).await?;
                tracing::info!(gift_id = %gift.id, "🤖 Picked '{}' -> {}", name, gift.status);
            }
            Err(no_match) => {
                gift.cancel(NO_SUITABLE_ITEM_REASON)?;
                self.write(&gift, GiftStatus::AgentPicking).await?;
                tracing::info!(gift_id = %gift.id, "🛑 Gift cancelled: {}", no_match);
            }
        }

        Ok(gift)
    }

    /// ORDERED -> SHIPPED | CANCELLED
    pub async fn dispatch(&self, gift_id: Uuid) -> Result<Gift, DomainError> {
        let _claim = self.dispatching.claim(gift_id).ok_or_else(|| {
            DomainError::Conflict(format!("gift {} is already being dispatched", gift_id))
        })?;

        let mut gift = self.get_gift(gift_id).await?;
        if gift.status != GiftStatus::Ordered {
            return Err(DomainError::Conflict(format!(
                "gift {} is {}, not ordered",
                gift.id, gift.status
            )));
        }

        let address = match gift.delivery_address.clone() {
            Some(address) => Some(address),
            None => self.addresses.get_delivery_address(gift.recipient_id).await?,
        };
        let Some(address) = address else {
            gift.cancel(NO_DELIVERY_ADDRESS_REASON)?;
            self.write(&gift, GiftStatus::Ordered).await?;
            tracing::warn!(
                gift_id = %gift.id,
                "🛑 Gift cancelled: {}",
                NO_DELIVERY_ADDRESS_REASON
            );
            return Ok(gift);
        };

        let (item_name, price) = match &gift.selection {
            Some(selection) => (selection.name.clone(), selection.price),
            None => {
                return Err(DomainError::Internal(format!(
                    "gift {} is ordered without a selection",
                    gift.id
                )))
            }
        };

        match self.dispatcher.dispatch(&item_name, &address, price).await {
            Ok(success) => {
                let record = success.record;
                if gift.delivery_address.is_none() {
                    gift.delivery_address = Some(address);
                }
                gift.mark_shipped(record.clone())?;

                match self.gifts.update_if_status(&gift, GiftStatus::Ordered).await {
                    Ok(true) => {
                        tracing::info!(
                            gift_id = %gift.id,
                            platform = %record.platform,
                            "🚚 Gift shipped ({} failed attempts first)",
                            success.failures.len()
                        );
                        Ok(gift)
                    }
                    Ok(false) => {
                        tracing::error!(
                            gift_id = %gift.id,
                            platform = %record.platform,
                            order_id = %record.order_id,
                            "Order placed but gift changed meanwhile; order needs manual cancellation"
                        );
                        Err(DomainError::OrphanedOrder {
                            gift_id: gift.id,
                            platform: record.platform,
                            order_id: record.order_id,
                        })
                    }
                    Err(e) => {
                        tracing::error!(
                            gift_id = %gift.id,
                            platform = %record.platform,
                            order_id = %record.order_id,
                            "Order placed but recording it failed: {}",
                            e
                        );
                        Err(e)
                    }
                }
            }
            Err(exhausted) => {
                gift.cancel(&exhausted.summary())?;
                if !self.gifts.update_if_status(&gift, GiftStatus::Ordered).await? {
                    // Someone else cancelled first; nothing was ordered
                    tracing::info!(
                        gift_id = %gift.id,
                        "Dispatch failed on an already changed gift"
                    );
                    return self.get_gift(gift_id).await;
                }
                tracing::warn!(gift_id = %gift.id, "🛑 Gift cancelled: {}", exhausted);
                Ok(gift)
            }
        }
    }

    async fn write(&self, gift: &Gift, expected: GiftStatus) -> Result<(), DomainError> {
        if self.gifts.update_if_status(gift, expected).await? {
            Ok(())
        } else {
            Err(DomainError::Conflict(format!(
                "gift {} is no longer {}",
                gift.id, expected
            )))
        }
    }
}

/// Gifts with a dispatch in progress
#[derive(Debug, Default)]
struct InFlight {
    ids: Mutex<HashSet<Uuid>>,
}

impl InFlight {
    fn claim(&self, id: Uuid) -> Option<InFlightClaim<'_>> {
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        ids.insert(id).then_some(InFlightClaim { owner: self, id })
    }
}

struct InFlightClaim<'a> {
    owner: &'a InFlight,
    id: Uuid,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        let mut ids = self.owner.ids.lock().unwrap_or_else(|e| e.into_inner());
        ids.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Harness;
    use crate::domain::{DeliveryPlatform, PersonaHints};

    #[tokio::test]
    async fn test_create_enters_agent_picking() {
        let harness = Harness::new().await;
        let submission = harness
            .gifts
            .create_gift(harness.approval_request())
            .await
            .unwrap();
        assert_eq!(submission.gift.status, GiftStatus::AgentPicking);

        let gift = submission.ticket.unwrap().wait().await.unwrap();
        assert_eq!(gift.status, GiftStatus::AwaitingApproval);
        assert!(gift.selection.is_some());
        assert!(gift.agent_reasoning.is_some());
        assert!(gift.ordered_at.is_none());
    }

    #[tokio::test]
    async fn test_missing_address_falls_back_to_default() {
        let harness = Harness::new().await;
        let mut request = harness.surprise_request();
        request.delivery_address = None;

        let submission = harness.gifts.create_gift(request).await.unwrap();
        assert_eq!(
            submission.gift.delivery_address.as_deref(),
            Some(Harness::DEFAULT_ADDRESS)
        );
    }

    #[tokio::test]
    async fn test_surprise_without_any_address_is_rejected() {
        let harness = Harness::new().await;
        let mut request = harness.surprise_request();
        request.recipient_id = Uuid::new_v4();
        request.delivery_address = None;

        let err = harness.gifts.create_gift(request).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(harness.repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_quick_surprise_defaults() {
        let harness = Harness::new().await;
        let submission = harness
            .gifts
            .surprise(SurpriseRequest {
                sender_id: harness.sender,
                recipient_id: harness.recipient,
                budget_max: 1000.0,
                budget_min: None,
                vibe_prompt: None,
                sender_message: None,
            })
            .await
            .unwrap();

        assert!(submission.gift.is_surprise);
        assert_eq!(submission.gift.vibe_prompt, "something chaotic and fun");
        assert_eq!(submission.gift.budget_min, 0.0);
        let gift = submission.ticket.unwrap().wait().await.unwrap();
        assert_eq!(gift.status, GiftStatus::Shipped);
    }

    #[tokio::test]
    async fn test_only_sender_may_approve() {
        let harness = Harness::new().await;
        let gift = harness.awaiting_approval().await;

        let err = harness
            .gifts
            .approve(gift.id, harness.recipient, true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(
            harness.gifts.get_gift(gift.id).await.unwrap().status,
            GiftStatus::AwaitingApproval
        );
    }

    #[tokio::test]
    async fn test_double_approval_conflicts() {
        let harness = Harness::new().await;
        let gift = harness.awaiting_approval().await;

        let first = harness.gifts.approve(gift.id, harness.sender, true).await.unwrap();
        assert_eq!(first.gift.status, GiftStatus::Ordered);
        let err = harness
            .gifts
            .approve(gift.id, harness.sender, true)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let shipped = first.ticket.unwrap().wait().await.unwrap();
        assert_eq!(shipped.status, GiftStatus::Shipped);
    }

    #[tokio::test]
    async fn test_persona_style_drives_pick() {
        let harness = Harness::new().await;
        harness
            .personas
            .set_persona(harness.recipient, PersonaHints::with_style("foodie"))
            .await;

        let submission = harness
            .gifts
            .create_gift(harness.approval_request())
            .await
            .unwrap();
        let gift = submission.ticket.unwrap().wait().await.unwrap();
        assert_eq!(
            gift.selection.unwrap().category,
            crate::domain::GiftCategory::Foodie
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_status_unchanged() {
        let harness = Harness::new().await;
        let gift = harness.awaiting_approval().await;

        harness.repo.fail_next_update();
        let err = harness
            .gifts
            .approve(gift.id, harness.sender, true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Repository(_)));

        let stored = harness.gifts.get_gift(gift.id).await.unwrap();
        assert_eq!(stored.status, GiftStatus::AwaitingApproval);
        assert!(stored.ordered_at.is_none());
    }

    #[tokio::test]
    async fn test_failed_pick_write_cancels_with_reason() {
        let harness = Harness::new().await;
        harness.repo.fail_next_update();

        let submission = harness
            .gifts
            .create_gift(harness.approval_request())
            .await
            .unwrap();
        let gift = submission.ticket.unwrap().wait().await.unwrap();

        assert_eq!(gift.status, GiftStatus::Cancelled);
        let reasoning = gift.agent_reasoning.as_deref().unwrap();
        assert!(reasoning.starts_with(PICK_NOT_SAVED_REASON), "{reasoning}");
        assert!(reasoning.contains("simulated write failure"));
        assert_eq!(harness.gifts.get_gift(gift.id).await.unwrap(), gift);
    }

    fn stored_gift(harness: &Harness, status: GiftStatus) -> Gift {
        let mut gift = Gift::new(harness.surprise_request(), harness.clock.now());
        gift.start_picking().unwrap();
        if status == GiftStatus::Ordered {
            gift.record_selection(
                crate::domain::GiftSelection {
                    name: "Rubber Chicken".to_string(),
                    description: "Screams on demand".to_string(),
                    price: 299.0,
                    image_url: "https://example.com/chicken.png".to_string(),
                    category: crate::domain::GiftCategory::Chaotic,
                },
                "It screams.".to_string(),
                harness.clock.now(),
            )
            .unwrap();
        }
        assert_eq!(gift.status, status);
        gift
    }

    #[tokio::test]
    async fn test_recover_requeues_picking_gifts() {
        let harness = Harness::new().await;
        let stranded = harness
            .repo
            .create(&stored_gift(&harness, GiftStatus::AgentPicking))
            .await
            .unwrap();

        let recovery = harness.gifts.recover().await.unwrap();
        assert!(recovery.needs_attention.is_empty());
        assert_eq!(recovery.requeued.len(), 1);

        let ticket = recovery.requeued.into_iter().next().unwrap();
        assert_eq!(ticket.job(), GiftJob::Pick(stranded.id));
        let gift = ticket.wait().await.unwrap();
        assert_eq!(gift.status, GiftStatus::Shipped);
    }

    #[tokio::test]
    async fn test_recover_reports_ordered_gifts_without_dispatching() {
        let zepto = Arc::new(crate::adapters::ScriptedConnector::succeeding(
            DeliveryPlatform::Zepto,
        ));
        let harness = Harness::with_connectors(vec![zepto.clone()]).await;
        let ordered = harness
            .repo
            .create(&stored_gift(&harness, GiftStatus::Ordered))
            .await
            .unwrap();

        let recovery = harness.gifts.recover().await.unwrap();
        assert!(recovery.requeued.is_empty());
        assert_eq!(recovery.needs_attention, vec![ordered.id]);

        let stored = harness.gifts.get_gift(ordered.id).await.unwrap();
        assert_eq!(stored.status, GiftStatus::Ordered);
        assert_eq!(zepto.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_dispatch_in_flight_reports_orphan() {
        let harness = Harness::with_connectors(vec![Arc::new(
            crate::adapters::ScriptedConnector::succeeding(DeliveryPlatform::Zepto)
                .with_delay(std::time::Duration::from_millis(50)),
        )])
        .await;
        let gift = harness.awaiting_approval().await;
        let approved = harness.gifts.approve(gift.id, harness.sender, true).await.unwrap();

        // Cancel while the connector is still working
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let err = harness.gifts.dispatch(gift.id).await.unwrap_err();
        assert!(err.is_conflict(), "second dispatch must not start: {err}");
        let cancelled = harness.gifts.cancel(gift.id, "changed my mind").await.unwrap();
        assert_eq!(cancelled.status, GiftStatus::Cancelled);

        let err = approved.ticket.unwrap().wait().await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::OrphanedOrder {
                platform: DeliveryPlatform::Zepto,
                ..
            }
        ));
        let stored = harness.gifts.get_gift(gift.id).await.unwrap();
        assert_eq!(stored.status, GiftStatus::Cancelled);
        assert!(stored.dispatch.is_none());
    }

    #[tokio::test]
    async fn test_in_flight_claim_is_released() {
        let flight = InFlight::default();
        let id = Uuid::new_v4();
        {
            let _claim = flight.claim(id).unwrap();
            assert!(flight.claim(id).is_none());
        }
        assert!(flight.claim(id).is_some());
    }

    #[tokio::test]
    async fn test_mark_delivered_requires_shipped() {
        let harness = Harness::new().await;
        let gift = harness.awaiting_approval().await;
        let err = harness.gifts.mark_delivered(gift.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }
}
