//! Scripted platform connector
//!
//! Deterministic connector for tests and demos: always succeeds or always
//! fails, optionally after a delay, and counts how often it was called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DeliveryPlatform;
use crate::ports::{ConnectorError, OrderConfirmation, OrderRequest, PlatformConnector};

#[derive(Debug)]
pub struct ScriptedConnector {
    platform: DeliveryPlatform,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedConnector {
    pub fn succeeding(platform: DeliveryPlatform) -> Self {
        Self {
            platform,
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(platform: DeliveryPlatform, reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::succeeding(platform)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `place_order` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformConnector for ScriptedConnector {
    fn platform(&self) -> DeliveryPlatform {
        self.platform
    }

    async fn place_order(
        &self,
        _order: &OrderRequest,
    ) -> Result<OrderConfirmation, ConnectorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(reason) => Err(ConnectorError::new(reason.clone())),
            None => {
                let order_id = format!("{}-{:04}", self.platform.as_str().to_uppercase(), call);
                Ok(OrderConfirmation {
                    tracking_url: Some(format!("https://track.example/{order_id}")),
                    order_id,
                })
            }
        }
    }
}
