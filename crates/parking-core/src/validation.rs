//! # Validation Module
//!
//! Input shape validation for the parking backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request decoding (serde)                                     │
//! │  └── Types and required fields                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-empty text, column widths                                     │
//! │  └── Capacity ranges (0 <= available <= total)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── Foreign keys                                                      │
//! │  └── Partial UNIQUE index on active sessions                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use parking_core::validation::validate_new_client;
//! use parking_core::NewClient;
//!
//! let client = validate_new_client(NewClient {
//!     name: " Luke ".to_string(),
//!     surname: "Skywalker".to_string(),
//!     payment_credential: Some("".to_string()),
//!     plate: "M001MM186".to_string(),
//! })
//! .unwrap();
//!
//! assert_eq!(client.name, "Luke");
//! assert_eq!(client.payment_credential, None);
//! ```

use crate::error::ValidationError;
use crate::types::{NewClient, NewParkingLot};
use crate::{MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PAYMENT_CREDENTIAL_LEN, MAX_PLATE_LEN, MAX_SURNAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters (not bytes)
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional payment credential.
///
/// A blank credential is the same as none.
pub fn validate_payment_credential(value: Option<&str>) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(credential) => {
            validate_text("payment_credential", credential, MAX_PAYMENT_CREDENTIAL_LEN).map(Some)
        }
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an entity id supplied by a caller.
///
/// ## Rules
/// - Must be positive; the store starts numbering at 1
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates lot capacity figures.
///
/// ## Rules
/// - `total_places >= 0`
/// - `0 <= available_places <= total_places`
pub fn validate_capacity(total_places: i64, available_places: i64) -> ValidationResult<()> {
    if total_places < 0 {
        return Err(ValidationError::Negative {
            field: "total_places".to_string(),
        });
    }

    if available_places < 0 || available_places > total_places {
        return Err(ValidationError::OutOfRange {
            field: "available_places".to_string(),
            min: 0,
            max: total_places,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates and normalizes a client registration.
pub fn validate_new_client(input: NewClient) -> ValidationResult<NewClient> {
    Ok(NewClient {
        name: validate_text("name", &input.name, MAX_NAME_LEN)?,
        surname: validate_text("surname", &input.surname, MAX_SURNAME_LEN)?,
        payment_credential: validate_payment_credential(input.payment_credential.as_deref())?,
        plate: validate_text("plate", &input.plate, MAX_PLATE_LEN)?,
    })
}

/// Validates and normalizes a lot definition.
pub fn validate_new_lot(input: NewParkingLot) -> ValidationResult<NewParkingLot> {
    validate_capacity(input.total_places, input.available_places)?;

    Ok(NewParkingLot {
        address: validate_text("address", &input.address, MAX_ADDRESS_LEN)?,
        ..input
    })
}

/// Parses a numeric id from text (CLI arguments, path segments).
pub fn parse_id(field: &str, raw: &str) -> ValidationResult<i64> {
    let id: i64 = raw.trim().parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be an integer".to_string(),
    })?;
    validate_id(field, id)?;
    Ok(id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_client() -> NewClient {
        NewClient {
            name: "Revan".to_string(),
            surname: "Darth".to_string(),
            payment_credential: None,
            plate: "B002BB".to_string(),
        }
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("name", "  Luke ", 50).unwrap(), "Luke");
        assert!(validate_text("name", "", 50).is_err());
        assert!(validate_text("name", "   ", 50).is_err());
        assert!(validate_text("name", &"A".repeat(51), 50).is_err());
    }

    #[test]
    fn test_validate_text_counts_characters() {
        // 9 Cyrillic characters, 18 bytes
        assert!(validate_text("surname", "Скайуокер", 10).is_ok());
    }

    #[test]
    fn test_validate_new_client() {
        assert!(validate_new_client(new_client()).is_ok());

        let mut long_plate = new_client();
        long_plate.plate = "X".repeat(11);
        assert!(matches!(
            validate_new_client(long_plate),
            Err(ValidationError::TooLong { max: 10, .. })
        ));

        let mut blank_card = new_client();
        blank_card.payment_credential = Some("  ".to_string());
        assert_eq!(validate_new_client(blank_card).unwrap().payment_credential, None);
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(0, 0).is_ok());
        assert!(validate_capacity(50, 50).is_ok());
        assert!(validate_capacity(50, 0).is_ok());

        assert!(validate_capacity(-1, 0).is_err());
        assert!(validate_capacity(10, -1).is_err());
        assert!(validate_capacity(10, 11).is_err());
    }

    #[test]
    fn test_validate_new_lot() {
        let lot = validate_new_lot(NewParkingLot {
            address: " Jedi Spaceport ".to_string(),
            opened: true,
            total_places: 50,
            available_places: 50,
        })
        .unwrap();
        assert_eq!(lot.address, "Jedi Spaceport");
        assert_eq!(lot.total_places, 50);

        assert!(validate_new_lot(NewParkingLot {
            address: String::new(),
            opened: true,
            total_places: 1,
            available_places: 1,
        })
        .is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("client_id", "3").unwrap(), 3);
        assert!(parse_id("client_id", "0").is_err());
        assert!(parse_id("client_id", "abc").is_err());
        assert!(parse_id("client_id", "-4").is_err());
    }
}
