//! Giftify API Routes
//!
//! - /giftify/gifts - Gift creation, approval and lifecycle
//! - /giftify/surprise - One-shot surprise gifts
//! - /giftify/users/:user_id/gifts - Sent and received listings
//! - /giftify/subscriptions - Recurring gift subscriptions
//! - /giftify/scheduler/tick - Manual scheduler tick

pub mod gift;
pub mod scheduler;
pub mod subscription;
pub mod swagger;

use axum::http::StatusCode;
use giftify::DomainError;

/// Error shape shared by every handler
pub type ApiError = (StatusCode, String);

/// Map a domain error onto an HTTP status
pub fn domain_error(e: DomainError) -> ApiError {
    let status = match &e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Conflict(_)
        | DomainError::InvalidTransition { .. }
        | DomainError::OrphanedOrder { .. } => StatusCode::CONFLICT,
        DomainError::Repository(_) | DomainError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("❌ {}", e);
    }
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(
            domain_error(DomainError::not_found("Gift", id)).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            domain_error(DomainError::validation("budget")).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_error(DomainError::Forbidden("not yours".into())).0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            domain_error(DomainError::Conflict("in flight".into())).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            domain_error(DomainError::Repository("down".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
