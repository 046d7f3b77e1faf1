//! # Session Lifecycle
//!
//! The entry/exit rules, as pure functions over already-loaded entities.
//!
//! ## Two Lifecycles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Per (client, lot) pair                                                 │
//! │                                                                         │
//! │          Enter                                                          │
//! │   Away ─────────► Parked        (exactly one session, time_out = None) │
//! │    ▲                 │                                                  │
//! │    └──────Exit───────┘                                                  │
//! │                                                                         │
//! │  Per lot (LotState)                                                     │
//! │                                                                         │
//! │  Enter: available - 1; closes the lot when it reaches 0                │
//! │  Exit:  available + 1; always reopens the lot                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The planners run every precondition against a snapshot read inside the
//! store transaction and return the mutations to perform. Nothing here touches
//! the store, so a rejected request never leaves anything to undo.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Client, ParkingLot, ParkingSession};

// =============================================================================
// Lot State Machine
// =============================================================================

/// Capacity-related state of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotState {
    pub opened: bool,
    pub total_places: i64,
    pub available_places: i64,
}

/// A capacity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A vehicle takes a place.
    Enter,
    /// A vehicle frees a place.
    Exit,
}

/// Applies a transition to a lot.
///
/// ## Rules
/// - `Enter` on a closed lot fails with `LotClosed`, whatever the capacity.
/// - `Enter` with no free place fails with `LotFull`.
/// - `Enter` taking the last place closes the lot.
/// - `Exit` frees one place (never beyond `total_places`) and reopens the
///   lot, including a lot that was forced closed.
///
/// The error variants carry `lot_id = 0`; use [`apply_to`] when the id is
/// known.
pub fn apply(state: LotState, transition: Transition) -> CoreResult<LotState> {
    apply_with_id(0, state, transition)
}

/// Applies a transition to a loaded lot, returning its next state.
pub fn apply_to(lot: &ParkingLot, transition: Transition) -> CoreResult<LotState> {
    apply_with_id(lot.id, lot.state(), transition)
}

fn apply_with_id(lot_id: i64, state: LotState, transition: Transition) -> CoreResult<LotState> {
    match transition {
        Transition::Enter => {
            if !state.opened {
                return Err(CoreError::LotClosed(lot_id));
            }
            if state.available_places <= 0 {
                return Err(CoreError::LotFull(lot_id));
            }
            let available_places = state.available_places - 1;
            Ok(LotState {
                opened: available_places > 0,
                total_places: state.total_places,
                available_places,
            })
        }
        Transition::Exit => Ok(LotState {
            opened: true,
            total_places: state.total_places,
            available_places: (state.available_places + 1).min(state.total_places),
        }),
    }
}

// =============================================================================
// Occupancy
// =============================================================================

/// Lifecycle state of a (client, lot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// No active session.
    Away,
    /// One active session.
    Parked,
}

impl Occupancy {
    /// Derives the occupancy from the active session lookup.
    pub fn of(active: Option<&ParkingSession>) -> Self {
        match active {
            Some(session) if session.is_active() => Occupancy::Parked,
            _ => Occupancy::Away,
        }
    }
}

// =============================================================================
// Planners
// =============================================================================

/// Mutations that admit a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPlan {
    pub client_id: i64,
    pub lot_id: i64,
    /// State to write back onto the lot.
    pub lot_state: LotState,
}

/// Runs the admission check.
///
/// ## Check Order (first failure wins)
/// 1. client exists → `ClientNotFound`
/// 2. lot exists → `LotNotFound`
/// 3. lot opened → `LotClosed`
/// 4. free place → `LotFull`
/// 5. not already parked here → `AlreadyParked`
pub fn plan_entry(
    client_id: i64,
    lot_id: i64,
    client: Option<&Client>,
    lot: Option<&ParkingLot>,
    active: Option<&ParkingSession>,
) -> CoreResult<EntryPlan> {
    if client.is_none() {
        return Err(CoreError::ClientNotFound(client_id));
    }
    let lot = lot.ok_or(CoreError::LotNotFound(lot_id))?;

    let lot_state = apply_to(lot, Transition::Enter)?;

    if Occupancy::of(active) == Occupancy::Parked {
        return Err(CoreError::AlreadyParked { client_id, lot_id });
    }

    Ok(EntryPlan {
        client_id,
        lot_id,
        lot_state,
    })
}

/// Mutations that let a vehicle leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPlan {
    /// Session to close.
    pub session_id: i64,
    /// Lot to update, or `None` when the lot no longer exists.
    pub lot: Option<(i64, LotState)>,
    /// The lot already showed every place free, so the exit could not add one.
    pub capacity_clamped: bool,
}

/// Runs the exit check.
///
/// ## Check Order (first failure wins)
/// 1. client exists → `ClientNotFound`
/// 2. client can pay → `NoPaymentMethod`
/// 3. active session for (client, lot) → `SessionNotFound`
///
/// The lot is not re-validated: a missing lot only skips the capacity update.
pub fn plan_exit(
    client_id: i64,
    lot_id: i64,
    client: Option<&Client>,
    active: Option<&ParkingSession>,
    lot: Option<&ParkingLot>,
) -> CoreResult<ExitPlan> {
    let client = client.ok_or(CoreError::ClientNotFound(client_id))?;
    if !client.can_pay() {
        return Err(CoreError::NoPaymentMethod(client_id));
    }

    let session = match active {
        Some(session) if session.is_active() => session,
        _ => return Err(CoreError::SessionNotFound { client_id, lot_id }),
    };

    let (lot, capacity_clamped) = match lot {
        Some(lot) => (
            Some((lot.id, apply_to(lot, Transition::Exit)?)),
            lot.available_places >= lot.total_places,
        ),
        None => (None, false),
    };

    Ok(ExitPlan {
        session_id: session.id,
        lot,
        capacity_clamped,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
