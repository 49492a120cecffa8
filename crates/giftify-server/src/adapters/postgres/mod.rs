//! PostgreSQL Repository Implementations

mod gift_repository;
mod persona_repository;
mod subscription_repository;

pub use gift_repository::PgGiftRepository;
pub use persona_repository::PgPersonaRepository;
pub use subscription_repository::PgSubscriptionRepository;
