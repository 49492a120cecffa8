//! Simulated quick-commerce connectors
//!
//! Stand-ins for the Blinkit, Zepto, Swiggy Instamart and Amazon
//! integrations. Each accepts an order with a fixed probability; every roll
//! goes through the injected `RandomSource`.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use giftify::{
    ConnectorError, DeliveryPlatform, OrderConfirmation, OrderRequest, PlatformConnector,
    RandomSource,
};

/// Behaviour of one simulated provider
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedProfile {
    pub success_rate: f64,
    pub failure_message: &'static str,
    pub order_prefix: &'static str,
    pub tracking_base: &'static str,
}

impl SimulatedProfile {
    /// Known profile for a platform; `Manual` has none
    pub fn for_platform(platform: DeliveryPlatform) -> Option<Self> {
        let profile = match platform {
            DeliveryPlatform::Blinkit => Self {
                success_rate: 0.85,
                failure_message: "Product currently unavailable in your area",
                order_prefix: "BL",
                tracking_base: "https://blinkit.com/track",
            },
            DeliveryPlatform::Zepto => Self {
                success_rate: 0.82,
                failure_message: "Delivery not available in your location",
                order_prefix: "ZP",
                tracking_base: "https://zepto.com/track",
            },
            DeliveryPlatform::SwiggyInstamart => Self {
                success_rate: 0.80,
                failure_message: "Store closed or product unavailable",
                order_prefix: "SW",
                tracking_base: "https://swiggy.com/track",
            },
            DeliveryPlatform::Amazon => Self {
                success_rate: 0.95,
                failure_message: "Payment failed or item out of stock",
                order_prefix: "AZ",
                tracking_base: "https://amazon.in/track",
            },
            DeliveryPlatform::Manual => return None,
        };
        Some(profile)
    }
}

pub struct SimulatedConnector {
    platform: DeliveryPlatform,
    profile: SimulatedProfile,
    random: Arc<dyn RandomSource>,
}

impl SimulatedConnector {
    pub fn new(
        platform: DeliveryPlatform,
        profile: SimulatedProfile,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            platform,
            profile,
            random,
        }
    }

    /// Connector with the platform's known profile
    pub fn for_platform(platform: DeliveryPlatform, random: Arc<dyn RandomSource>) -> Option<Self> {
        SimulatedProfile::for_platform(platform).map(|profile| Self::new(platform, profile, random))
    }
}

#[async_trait]
impl PlatformConnector for SimulatedConnector {
    fn platform(&self) -> DeliveryPlatform {
        self.platform
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ConnectorError> {
        if !self.random.chance(self.profile.success_rate) {
            return Err(ConnectorError::new(self.profile.failure_message));
        }

        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        let order_id = format!("{}-{}", self.profile.order_prefix, suffix);
        tracing::debug!(
            platform = %self.platform,
            "Simulated order {} for {} x '{}' ({:.2} total)",
            order_id,
            order.quantity,
            order.item_name,
            order.price * f64::from(order.quantity)
        );

        Ok(OrderConfirmation {
            tracking_url: Some(format!("{}/{}", self.profile.tracking_base, order_id)),
            order_id,
        })
    }
}

/// Build connectors for an ordered platform list, skipping those without a profile
pub fn simulated_connectors(
    platforms: &[DeliveryPlatform],
    random: Arc<dyn RandomSource>,
) -> Vec<Arc<dyn PlatformConnector>> {
    platforms
        .iter()
        .filter_map(|&platform| match SimulatedConnector::for_platform(platform, random.clone()) {
            Some(connector) => Some(Arc::new(connector) as Arc<dyn PlatformConnector>),
            None => {
                tracing::warn!("⚠️  No simulated connector for {}, skipping", platform);
                None
            }
        })
        .collect()
}
