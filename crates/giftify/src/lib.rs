//! Giftify Domain Library
//!
//! Core of the Giftify gift procurement orchestrator: turns a free-text
//! "vibe" and a budget into a concrete item, places the order with the first
//! delivery platform that accepts it, and originates gifts from recurring
//! subscriptions.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Gift, GiftSubscription, PersonaHints
//!   - `value_objects/`: GiftStatus, GiftCategory, DeliveryPlatform, Frequency, TimeOfDay
//!   - `services/`: Catalog, Selection Engine, Delivery Dispatcher, due rule
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Gift and subscription persistence
//!   - `services/`: Clock, randomness, persona/address lookups, platform connectors
//!
//! - **Application** (`application/`): Gift state machine, background worker,
//!   subscription scheduler and management
//!
//! - **Adapters** (`adapters/`): In-process port implementations
//!
//! # Usage
//!
//! ```rust,ignore
//! use giftify::application::{GiftQueue, GiftService, GiftWorker};
//! use giftify::domain::services::{DeliveryDispatcher, SelectionEngine};
//!
//! let (queue, jobs) = GiftQueue::channel();
//! let gifts = Arc::new(GiftService::new(repo, personas, addresses, selection, dispatcher, clock, queue));
//! GiftWorker::new(gifts.clone(), jobs, WorkerConfig::default()).start();
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use application::{
    GiftJob, GiftQueue, GiftService, GiftWorker, JobTicket, Recovery, SchedulerConfig,
    Submission, SubscriptionScheduler, SubscriptionService, SurpriseRequest, TickInProgress,
    TickReport, WorkerConfig,
};
pub use domain::{
    DeliveryPlatform, DispatchRecord, DomainError, Frequency, Gift, GiftCategory, GiftSelection,
    GiftStatus, GiftSubscription, NewGift, NewSubscription, PersonaHints, SubscriptionPatch,
    TimeOfDay,
};
pub use ports::{
    AddressResolver, Clock, ConnectorError, GiftRepository, OrderConfirmation, OrderRequest,
    PersonaReader, PlatformConnector, RandomSource, SubscriptionRepository,
};
