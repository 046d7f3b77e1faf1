//! # Domain Types
//!
//! Entities used throughout the parking backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌────────────────────┐  │
//! │  │     Client       │   │   ParkingLot     │   │  ParkingSession    │  │
//! │  │  ──────────────  │   │  ──────────────  │   │  ────────────────  │  │
//! │  │  id              │   │  id              │   │  id                │  │
//! │  │  name, surname   │   │  address         │   │  client_id (FK)    │  │
//! │  │  payment_cred?   │   │  opened          │   │  lot_id (FK)       │  │
//! │  │  plate           │   │  total_places    │   │  time_in           │  │
//! │  │                  │   │  available_places│   │  time_out?         │  │
//! │  └──────────────────┘   └──────────────────┘   └────────────────────┘  │
//! │                                                                         │
//! │  A session with time_out = None is ACTIVE: the car is in the lot.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are assigned by the store (`INTEGER PRIMARY KEY`). The `New*` structs
//! carry everything a caller provides at creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::LotState;

// =============================================================================
// Client
// =============================================================================

/// A registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    /// Store-assigned identifier.
    pub id: i64,

    /// First name.
    pub name: String,

    /// Last name.
    pub surname: String,

    /// Card or account reference used to pay on exit.
    /// `None` means the client cannot leave a lot.
    pub payment_credential: Option<String>,

    /// Vehicle plate.
    pub plate: String,
}

impl Client {
    /// Whether the client can settle an exit.
    pub fn can_pay(&self) -> bool {
        self.payment_credential
            .as_deref()
            .is_some_and(|credential| !credential.trim().is_empty())
    }
}

/// Input for registering a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub surname: String,
    pub payment_credential: Option<String>,
    pub plate: String,
}

// =============================================================================
// Parking Lot
// =============================================================================

/// A parking facility with finite capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ParkingLot {
    /// Store-assigned identifier.
    pub id: i64,

    /// Street address.
    pub address: String,

    /// Whether the lot accepts new entries.
    pub opened: bool,

    /// Capacity, fixed at creation.
    pub total_places: i64,

    /// Free places. Kept in step with the active sessions by the engine.
    pub available_places: i64,
}

impl ParkingLot {
    /// The capacity-related part of the lot, as seen by the state machine.
    #[inline]
    pub fn state(&self) -> LotState {
        LotState {
            opened: self.opened,
            total_places: self.total_places,
            available_places: self.available_places,
        }
    }

    /// Copies a state machine result back onto the lot.
    pub fn set_state(&mut self, state: LotState) {
        self.opened = state.opened;
        self.available_places = state.available_places;
    }
}

/// Input for creating a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParkingLot {
    pub address: String,
    pub opened: bool,
    pub total_places: i64,
    pub available_places: i64,
}

impl NewParkingLot {
    /// The state the lot is stored with.
    ///
    /// A lot without free places never starts open.
    pub fn initial_state(&self) -> LotState {
        LotState {
            opened: self.opened && self.available_places > 0,
            total_places: self.total_places,
            available_places: self.available_places,
        }
    }
}

// =============================================================================
// Parking Session
// =============================================================================

/// One client's continuous occupancy of one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ParkingSession {
    /// Store-assigned identifier.
    pub id: i64,

    pub client_id: i64,

    pub lot_id: i64,

    /// When the vehicle entered.
    pub time_in: DateTime<Utc>,

    /// When the vehicle left. `None` while the session is active.
    pub time_out: Option<DateTime<Utc>>,
}

impl ParkingSession {
    /// Whether the vehicle is still in the lot.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.time_out.is_none()
    }

    /// Exit timestamp for closing this session at `now`.
    ///
    /// Never earlier than `time_in`, even if the wall clock went backwards.
    pub fn exit_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.time_in)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
