//! In-process Adapters
//!
//! Implementations of the ports that need no infrastructure: clocks,
//! random sources, and in-memory stores. The server crate wires the
//! PostgreSQL and provider-backed adapters instead; tests and local runs
//! use these.

mod clock;
mod memory;
mod random;
mod scripted;

pub use clock::{ManualClock, SystemClock};
pub use memory::{InMemoryGiftRepository, InMemoryPersonaStore, InMemorySubscriptionRepository};
pub use random::{FixedRandom, SeededRandom, ThreadRandom};
pub use scripted::ScriptedConnector;
