//! # parking-core: Pure Domain Logic for the Parking Backend
//!
//! This crate is the **heart** of the parking backend. It contains the
//! entities, the admission rules and the lot capacity state machine as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Parking Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Command Surface (apps/parking-api)                 │   │
//! │  │   create_client, create_lot, enter, exit, get_client, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ parking-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │  lifecycle  │  │ validation│  │  error   │  │   │
//! │  │   │  Client   │  │  LotState   │  │  lengths  │  │CoreError │  │   │
//! │  │   │  Lot      │  │  Transition │  │  ranges   │  │          │  │   │
//! │  │   │  Session  │  │  planners   │  │           │  │          │  │   │
//! │  │   └───────────┘  └─────────────┘  └───────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  parking-db (Database Layer)                    │   │
//! │  │         SQLite store, migrations, repositories, Store trait     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Client, ParkingLot, ParkingSession) and their inputs
//! - [`lifecycle`] - Lot capacity state machine and entry/exit planners
//! - [`error`] - Domain error types
//! - [`validation`] - Input shape validation
//!
//! ## Example Usage
//!
//! ```rust
//! use parking_core::lifecycle::{apply, LotState, Transition};
//!
//! let lot = LotState { opened: true, total_places: 10, available_places: 1 };
//!
//! // Taking the last place closes the lot
//! let after = apply(lot, Transition::Enter).unwrap();
//! assert_eq!(after.available_places, 0);
//! assert!(!after.opened);
//!
//! // Any exit reopens it
//! let after = apply(after, Transition::Exit).unwrap();
//! assert_eq!(after.available_places, 1);
//! assert!(after.opened);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use lifecycle::{LotState, Occupancy, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================
// Column widths of the persisted schema. Validation rejects longer input
// before it reaches the store.

/// Maximum length of a client's first name.
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length of a client's surname.
pub const MAX_SURNAME_LEN: usize = 50;

/// Maximum length of a stored payment credential.
pub const MAX_PAYMENT_CREDENTIAL_LEN: usize = 50;

/// Maximum length of a vehicle plate.
pub const MAX_PLATE_LEN: usize = 10;

/// Maximum length of a lot address.
pub const MAX_ADDRESS_LEN: usize = 100;
