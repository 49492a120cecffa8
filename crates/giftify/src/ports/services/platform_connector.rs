//! Platform Connector Port
//!
//! One implementation per delivery provider. A connector makes exactly one
//! attempt per call; any retry policy for transient failures is internal to
//! the connector.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::DeliveryPlatform;

/// Order to place with a provider
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub item_name: String,
    pub address: String,
    pub price: f64,
    pub quantity: u32,
}

/// Provider confirmation of a placed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub tracking_url: Option<String>,
}

/// Why a provider refused or failed an order
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ConnectorError(pub String);

impl ConnectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Delivery platform integration
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    /// Identifier recorded on the gift when this connector succeeds
    fn platform(&self) -> DeliveryPlatform;

    /// Attempt to place a single order
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ConnectorError>;
}
