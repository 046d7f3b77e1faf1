//! # Error Types
//!
//! Domain-specific error types for parking-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  parking-core errors (this file)                                       │
//! │  ├── CoreError        - Admission / exit rule violations               │
//! │  └── ValidationError  - Input shape failures                           │
//! │                                                                         │
//! │  parking-db errors (separate crate)                                    │
//! │  └── DbError          - Store failures                                 │
//! │                                                                         │
//! │  parking-api errors (app)                                              │
//! │  ├── ServiceError     - CoreError | DbError                            │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴→ ServiceError → ApiError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is a client-input error, never a system fault. The
//! [`ErrorKind`] groups them the way callers react to them.

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced client, lot or session is absent.
    NotFound,
    /// The entities exist but the requested transition is not allowed.
    PreconditionFailed,
    /// The request itself is malformed.
    Validation,
}

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by the entry/exit rules.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Client cannot be found.
    #[error("Client not found: {0}")]
    ClientNotFound(i64),

    /// Parking lot cannot be found.
    #[error("Parking lot not found: {0}")]
    LotNotFound(i64),

    /// Lot is not accepting new entries.
    ///
    /// ## When This Occurs
    /// - Lot was created closed
    /// - Lot was auto-closed when its last place was taken
    #[error("Parking lot {0} is closed")]
    LotClosed(i64),

    /// Lot has no available places.
    #[error("Parking lot {0} has no available places")]
    LotFull(i64),

    /// The client already has an active session in this lot.
    #[error("Vehicle of client {client_id} is already parked in lot {lot_id}")]
    AlreadyParked { client_id: i64, lot_id: i64 },

    /// The client has no payment credential and cannot settle the exit.
    #[error("Client {0} has no payment method on file")]
    NoPaymentMethod(i64),

    /// No active session exists for the (client, lot) pair.
    ///
    /// ## User Workflow
    /// ```text
    /// Exit(client=3, lot=1)
    ///      │
    ///      ▼
    /// Active session for (3, 1)? ── no ──► SessionNotFound { 3, 1 }
    /// ```
    #[error("No active parking session for client {client_id} in lot {lot_id}")]
    SessionNotFound { client_id: i64, lot_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ClientNotFound(_)
            | CoreError::LotNotFound(_)
            | CoreError::SessionNotFound { .. } => ErrorKind::NotFound,
            CoreError::LotClosed(_)
            | CoreError::LotFull(_)
            | CoreError::AlreadyParked { .. }
            | CoreError::NoPaymentMethod(_) => ErrorKind::PreconditionFailed,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// Used for early validation before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-numeric id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AlreadyParked {
            client_id: 3,
            lot_id: 1,
        };
        assert_eq!(
            err.to_string(),
            "Vehicle of client 3 is already parked in lot 1"
        );

        assert_eq!(
            CoreError::NoPaymentMethod(2).to_string(),
            "Client 2 has no payment method on file"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::ClientNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::LotNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::SessionNotFound {
                client_id: 1,
                lot_id: 1
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CoreError::LotClosed(1).kind(), ErrorKind::PreconditionFailed);
        assert_eq!(CoreError::LotFull(1).kind(), ErrorKind::PreconditionFailed);
        assert_eq!(
            CoreError::NoPaymentMethod(1).kind(),
            ErrorKind::PreconditionFailed
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }
}
