//! Error types for the tideway workflow service.
//!
//! Service errors are classified so that callers can tell a client mistake
//! (BadRequest) apart from a server-side failure (InternalService). The
//! decision-task handler relies on this classification: BadRequest from a
//! validator or state mutator becomes a fail-decision verdict, everything
//! else aborts the batch.

use thiserror::Error;

/// Classified errors returned by the history service and its internals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("BadRequestError: {message}")]
    BadRequest { message: String },

    #[error("InternalServiceError: {message}")]
    InternalService { message: String },

    #[error("EntityNotExistsError: {message}")]
    EntityNotExists { message: String },

    #[error("DomainNotActiveError: {message}")]
    DomainNotActive { message: String },
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal_service(message: impl Into<String>) -> Self {
        ServiceError::InternalService {
            message: message.into(),
        }
    }

    pub fn entity_not_exists(message: impl Into<String>) -> Self {
        ServiceError::EntityNotExists {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest { message }
            | ServiceError::InternalService { message }
            | ServiceError::EntityNotExists { message }
            | ServiceError::DomainNotActive { message } => message,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Helper functions to check error classification
pub fn is_bad_request(err: &ServiceError) -> bool {
    matches!(err, ServiceError::BadRequest { .. })
}

pub fn is_internal_service(err: &ServiceError) -> bool {
    matches!(err, ServiceError::InternalService { .. })
}

pub fn is_entity_not_exists(err: &ServiceError) -> bool {
    matches!(err, ServiceError::EntityNotExists { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = ServiceError::bad_request("duplicate activity ID");
        assert!(is_bad_request(&err));
        assert!(!is_internal_service(&err));
        assert_eq!(err.message(), "duplicate activity ID");

        let err = ServiceError::internal_service("unable to add event");
        assert!(is_internal_service(&err));
        assert!(!is_bad_request(&err));
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::bad_request("timer ID is not set");
        assert_eq!(err.to_string(), "BadRequestError: timer ID is not set");
    }
}
