//! # Service and API Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Parking Backend                    │
//! │                                                                         │
//! │  ValidationError ──► CoreError::Validation ─┐                           │
//! │  plan_entry / plan_exit ──► CoreError ──────┼──► ServiceError::Core     │
//! │                                             │                           │
//! │  sqlx::Error ──► DbError ───────────────────┴──► ServiceError::         │
//! │                                                    Persistence          │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                      ApiError { code, status, message }                 │
//! │                                                                         │
//! │  {                                                                      │
//! │    "code": "LOT_FULL",                                                  │
//! │    "status": 400,                                                       │
//! │    "message": "Parking lot 1 has no available places"                   │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence details are logged, never returned to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use parking_core::{CoreError, ValidationError};
use parking_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Outcome of a failed engine or service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A domain rule or validation rejected the request.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed; nothing was committed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

/// Result type for engine and service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// HTTP-style status number
    pub status: u16,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Client, lot or active session not found (404)
    NotFound,

    /// Lot is closed (400)
    LotClosed,

    /// Lot has no free place (400)
    LotFull,

    /// Client already parked in this lot (400)
    AlreadyParked,

    /// Client cannot pay for the exit (400)
    NoPaymentMethod,

    /// Request input failed validation (422)
    ValidationError,

    /// Store failure (500)
    PersistenceError,
}

impl ErrorCode {
    /// Status number reported with this code.
    pub fn status(self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::LotClosed
            | ErrorCode::LotFull
            | ErrorCode::AlreadyParked
            | ErrorCode::NoPaymentMethod => 400,
            ErrorCode::ValidationError => 422,
            ErrorCode::PersistenceError => 500,
        }
    }
}

impl ApiError {
    /// Creates a new API error; the status follows from the code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            status: code.status(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ClientNotFound(_)
            | CoreError::LotNotFound(_)
            | CoreError::SessionNotFound { .. } => ErrorCode::NotFound,
            CoreError::LotClosed(_) => ErrorCode::LotClosed,
            CoreError::LotFull(_) => ErrorCode::LotFull,
            CoreError::AlreadyParked { .. } => ErrorCode::AlreadyParked,
            CoreError::NoPaymentMethod(_) => ErrorCode::NoPaymentMethod,
            CoreError::Validation(e) => return ApiError::validation(e.to_string()),
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, "Persistence failure");
        ApiError::new(ErrorCode::PersistenceError, "Database operation failed")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Persistence(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for command surface operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::ClientNotFound(1), ErrorCode::NotFound, 404),
            (CoreError::LotNotFound(1), ErrorCode::NotFound, 404),
            (
                CoreError::SessionNotFound {
                    client_id: 1,
                    lot_id: 2,
                },
                ErrorCode::NotFound,
                404,
            ),
            (CoreError::LotClosed(1), ErrorCode::LotClosed, 400),
            (CoreError::LotFull(1), ErrorCode::LotFull, 400),
            (
                CoreError::AlreadyParked {
                    client_id: 1,
                    lot_id: 2,
                },
                ErrorCode::AlreadyParked,
                400,
            ),
            (CoreError::NoPaymentMethod(1), ErrorCode::NoPaymentMethod, 400),
        ];

        for (err, code, status) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.code, code);
            assert_eq!(api.status, status);
        }
    }

    #[test]
    fn test_validation_is_422_with_field_message() {
        let err = ValidationError::Required {
            field: "plate".to_string(),
        };
        let api: ApiError = ServiceError::from(err).into();
        assert_eq!(api.code, ErrorCode::ValidationError);
        assert_eq!(api.status, 422);
        assert_eq!(api.message, "plate is required");
    }

    #[test]
    fn test_persistence_details_hidden() {
        let api: ApiError =
            ServiceError::Persistence(DbError::QueryFailed("disk I/O error".to_string())).into();
        assert_eq!(api.code, ErrorCode::PersistenceError);
        assert_eq!(api.status, 500);
        assert!(!api.message.contains("disk"));
    }

    #[test]
    fn test_serialization() {
        let api: ApiError = CoreError::LotFull(7).into();
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "LOT_FULL");
        assert_eq!(json["status"], 400);
        assert_eq!(json["message"], "Parking lot 7 has no available places");
    }
}
