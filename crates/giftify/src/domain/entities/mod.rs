//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Gift: A single procurement attempt and its lifecycle
//! - GiftSubscription: Recurring rule that originates gifts
//! - PersonaHints: Recipient preferences read from the persona store

mod gift;
mod persona;
mod subscription;

pub use gift::*;
pub use persona::*;
pub use subscription::*;
