//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod gift_repository;
mod subscription_repository;

pub use gift_repository::*;
pub use subscription_repository::*;
