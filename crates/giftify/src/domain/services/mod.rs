//! Domain Services
//!
//! Stateless domain logic that spans entities:
//! - `catalog`: Static gift shelves per category
//! - `selection`: Vibe + budget -> concrete item
//! - `dispatcher`: Ordered fallback across delivery platforms
//! - `schedule`: Subscription due rule and next occurrence

pub mod catalog;
pub mod dispatcher;
pub mod schedule;
pub mod selection;

pub use catalog::{CatalogItem, GiftCatalog};
pub use dispatcher::{
    ConnectorFailure, DeliveryDispatcher, DispatchExhausted, DispatchSuccess, DispatcherConfig,
};
pub use selection::{NoSuitableItem, Pick, SelectionEngine, NO_SUITABLE_ITEM_REASON};
