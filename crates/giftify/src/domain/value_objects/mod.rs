//! Value Objects
//!
//! Immutable types that describe a gift or schedule without identity.

mod category;
mod frequency;
mod gift_status;
mod platform;
mod time_of_day;

pub use category::*;
pub use frequency::*;
pub use gift_status::*;
pub use platform::*;
pub use time_of_day::*;
