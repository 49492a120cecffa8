//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories, collaborators and the background worker.

mod gift_service;
mod scheduler;
mod subscription_service;
mod worker;

#[cfg(test)]
mod test_support;

pub use gift_service::{
    GiftService, Recovery, Submission, SurpriseRequest, NO_DELIVERY_ADDRESS_REASON,
    PICK_NOT_SAVED_REASON,
};
pub use scheduler::{SchedulerConfig, SubscriptionScheduler, TickInProgress, TickReport};
pub use subscription_service::SubscriptionService;
pub use worker::{GiftJob, GiftJobs, GiftQueue, GiftWorker, JobTicket, WorkerConfig};
