//! HTTP renditions of guard outcomes.

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::policy::DenyReason;

/// Terminal guard outcomes rendered as responses.
///
/// Denial is a normal decision outcome, not an exception — it is always
/// rendered as a visible state (redirect, 403 with a reason, or 503 while
/// pending), never as a blank page or a generic crash.
#[derive(Debug, Error)]
pub enum GuardError {
    /// No valid session: send the client to the login entry point,
    /// preserving the originally requested path in `next`.
    #[error("authentication required")]
    AuthenticationRequired { location: String },

    /// Authenticated but not allowed here.
    #[error("access denied: {}", .reason.as_str())]
    AccessDenied { reason: DenyReason },

    /// Session still resolving; retry shortly. Distinct from denial so a
    /// transient state never renders as "forbidden".
    #[error("session is still resolving")]
    SessionPending,
}

impl ResponseError for GuardError {
    fn status_code(&self) -> StatusCode {
        match self {
            GuardError::AuthenticationRequired { .. } => StatusCode::FOUND,
            GuardError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            GuardError::SessionPending => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            GuardError::AuthenticationRequired { location } => HttpResponse::Found()
                .insert_header((header::LOCATION, location.as_str()))
                .finish(),
            GuardError::AccessDenied { reason } => {
                HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "access denied",
                    "reason": reason.as_str(),
                    "status": 403,
                }))
            }
            GuardError::SessionPending => HttpResponse::ServiceUnavailable()
                .insert_header((header::RETRY_AFTER, "1"))
                .json(serde_json::json!({
                    "error": "session is still resolving",
                    "status": 503,
                })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_carries_location_header() {
        let err = GuardError::AuthenticationRequired {
            location: "/login?next=%2Fdeals".to_string(),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fdeals"
        );
    }

    #[test]
    fn denial_is_forbidden_with_reason() {
        let err = GuardError::AccessDenied {
            reason: DenyReason::RoleNotAllowed,
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn pending_is_service_unavailable_not_forbidden() {
        let err = GuardError::SessionPending;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let resp = err.error_response();
        assert!(resp.headers().contains_key(header::RETRY_AFTER));
    }
}
