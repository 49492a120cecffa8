//! Delivery Dispatcher
//!
//! Tries each configured platform connector in order, once, and stops at
//! the first accepted order. A connector that errors or exceeds the attempt
//! timeout counts as failed and the next one is tried. Nothing is attempted
//! after a success, so an item is never ordered twice.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::DispatchRecord;
use crate::domain::value_objects::DeliveryPlatform;
use crate::ports::{OrderRequest, PlatformConnector};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound on a single connector attempt
    pub attempt_timeout: Duration,
    /// Units ordered per gift
    pub quantity: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(15),
            quantity: 1,
        }
    }
}

/// One connector's failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorFailure {
    pub platform: DeliveryPlatform,
    pub reason: String,
}

impl std::fmt::Display for ConnectorFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.platform, self.reason)
    }
}

/// Accepted order plus the failures that preceded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSuccess {
    pub record: DispatchRecord,
    pub failures: Vec<ConnectorFailure>,
}

/// Every connector failed; failures are in attempt order
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("all delivery platforms failed ({} attempted)", .failures.len())]
pub struct DispatchExhausted {
    pub failures: Vec<ConnectorFailure>,
}

impl DispatchExhausted {
    /// Text appended to the gift's reasoning
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            return "Order failed: no delivery platforms configured.".to_string();
        }
        let lines: Vec<String> = self
            .failures
            .iter()
            .map(|failure| format!("- {failure}"))
            .collect();
        format!("Order failed on every platform:\n{}", lines.join("\n"))
    }
}

pub struct DeliveryDispatcher {
    connectors: Vec<Arc<dyn PlatformConnector>>,
    config: DispatcherConfig,
}

impl DeliveryDispatcher {
    /// `connectors` are attempted in the given order
    pub fn new(connectors: Vec<Arc<dyn PlatformConnector>>, config: DispatcherConfig) -> Self {
        Self { connectors, config }
    }

    pub fn platforms(&self) -> Vec<DeliveryPlatform> {
        self.connectors.iter().map(|c| c.platform()).collect()
    }

    pub async fn dispatch(
        &self,
        item_name: &str,
        address: &str,
        price: f64,
    ) -> Result<DispatchSuccess, DispatchExhausted> {
        let order = OrderRequest {
            item_name: item_name.to_string(),
            address: address.to_string(),
            price,
            quantity: self.config.quantity,
        };
        let mut failures = Vec::new();

        for connector in &self.connectors {
            let platform = connector.platform();
            let attempt =
                tokio::time::timeout(self.config.attempt_timeout, connector.place_order(&order))
                    .await;

            match attempt {
                Ok(Ok(confirmation)) => {
                    tracing::info!(
                        %platform,
                        order_id = %confirmation.order_id,
                        "📦 Order placed for '{}'",
                        item_name
                    );
                    return Ok(DispatchSuccess {
                        record: DispatchRecord {
                            platform,
                            order_id: confirmation.order_id,
                            tracking_url: confirmation.tracking_url,
                        },
                        failures,
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(%platform, "Order attempt failed: {}", e);
                    failures.push(ConnectorFailure {
                        platform,
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        %platform,
                        "Order attempt timed out after {:?}",
                        self.config.attempt_timeout
                    );
                    failures.push(ConnectorFailure {
                        platform,
                        reason: format!("timed out after {:?}", self.config.attempt_timeout),
                    });
                }
            }
        }

        Err(DispatchExhausted { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ScriptedConnector;

    fn dispatcher(connectors: &[Arc<ScriptedConnector>]) -> DeliveryDispatcher {
        DeliveryDispatcher::new(
            connectors
                .iter()
                .map(|c| c.clone() as Arc<dyn PlatformConnector>)
                .collect(),
            DispatcherConfig {
                attempt_timeout: Duration::from_millis(200),
                quantity: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_falls_back_to_second_platform() {
        let a = Arc::new(ScriptedConnector::failing(DeliveryPlatform::Blinkit, "out of stock"));
        let b = Arc::new(ScriptedConnector::succeeding(DeliveryPlatform::Zepto));

        let success = dispatcher(&[a.clone(), b.clone()])
            .dispatch("Screaming Goat Toy", "221B Baker Street", 299.0)
            .await
            .unwrap();

        assert_eq!(success.record.platform, DeliveryPlatform::Zepto);
        assert_eq!(
            success.failures,
            vec![ConnectorFailure {
                platform: DeliveryPlatform::Blinkit,
                reason: "out of stock".to_string(),
            }]
        );
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let a = Arc::new(ScriptedConnector::succeeding(DeliveryPlatform::Blinkit));
        let b = Arc::new(ScriptedConnector::succeeding(DeliveryPlatform::Zepto));

        let success = dispatcher(&[a.clone(), b.clone()])
            .dispatch("Cozy Socks", "somewhere", 299.0)
            .await
            .unwrap();

        assert_eq!(success.record.platform, DeliveryPlatform::Blinkit);
        assert!(success.failures.is_empty());
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_keeps_attempt_order() {
        let a = Arc::new(ScriptedConnector::failing(DeliveryPlatform::Blinkit, "closed"));
        let b = Arc::new(ScriptedConnector::failing(DeliveryPlatform::Zepto, "no riders"));

        let exhausted = dispatcher(&[a, b])
            .dispatch("Cozy Socks", "somewhere", 299.0)
            .await
            .unwrap_err();

        let platforms: Vec<_> = exhausted.failures.iter().map(|f| f.platform).collect();
        assert_eq!(
            platforms,
            vec![DeliveryPlatform::Blinkit, DeliveryPlatform::Zepto]
        );
        assert_eq!(
            exhausted.summary(),
            "Order failed on every platform:\n- blinkit: closed\n- zepto: no riders"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let slow = Arc::new(
            ScriptedConnector::succeeding(DeliveryPlatform::Amazon)
                .with_delay(Duration::from_secs(60)),
        );
        let fast = Arc::new(ScriptedConnector::succeeding(DeliveryPlatform::Zepto));

        let success = dispatcher(&[slow.clone(), fast])
            .dispatch("Mystery Box", "somewhere", 499.0)
            .await
            .unwrap();

        assert_eq!(success.record.platform, DeliveryPlatform::Zepto);
        assert_eq!(success.failures.len(), 1);
        assert!(success.failures[0].reason.starts_with("timed out"));
        assert_eq!(slow.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_connectors() {
        let exhausted = dispatcher(&[])
            .dispatch("Mystery Box", "somewhere", 499.0)
            .await
            .unwrap_err();
        assert!(exhausted.failures.is_empty());
        assert!(exhausted.summary().contains("no delivery platforms"));
    }
}
