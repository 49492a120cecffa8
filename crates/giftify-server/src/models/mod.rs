//! Request/Response models for the HTTP API

mod gift;
mod subscription;

pub use gift::*;
pub use subscription::*;
