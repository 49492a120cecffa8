//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod connectors;
pub mod postgres;

// Re-exports
pub use connectors::simulated_connectors;
pub use postgres::{PgGiftRepository, PgPersonaRepository, PgSubscriptionRepository};
