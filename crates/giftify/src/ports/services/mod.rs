//! Service Ports
//!
//! Interfaces for collaborators outside the orchestrator:
//! time, randomness, persona/address lookups, and delivery platforms.

mod clock;
mod persona;
mod platform_connector;
mod random;

pub use clock::*;
pub use persona::*;
pub use platform_connector::*;
pub use random::*;
