//! Persona and Address Ports
//!
//! Read-only views onto the persona store, which is owned elsewhere.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, PersonaHints};

/// Persona read collaborator. Absence is not an error.
#[async_trait]
pub trait PersonaReader: Send + Sync {
    async fn get_persona(&self, recipient_id: Uuid) -> Result<Option<PersonaHints>, DomainError>;
}

/// Resolves a recipient's default delivery address
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn get_delivery_address(&self, recipient_id: Uuid)
        -> Result<Option<String>, DomainError>;
}
