//! # Command Surface
//!
//! [`ParkingService`] is the one entry point for callers (the CLI, tests,
//! or a future transport). It validates input, hands reads to the store and
//! the two transitions to the [`Engine`], and converts every failure into an
//! [`ApiError`].
//!
//! ## Available Commands
//!
//! ### Client Commands
//! - `create_client` - Register a driver
//! - `get_client` / `list_clients` - Lookups
//! - `list_client_sessions` - Parking history
//!
//! ### Lot Commands
//! - `create_lot` - Register a lot
//! - `get_lot` / `list_lots` - Lookups
//!
//! ### Session Commands
//! - `enter` - Admit a vehicle
//! - `exit` - Pay and let a vehicle leave
//!
//! ### Health
//! - `health` - Database reachability and migration status

pub mod client;
pub mod health;
pub mod lot;
pub mod session;

use tracing::warn;

pub use client::CreateClientRequest;
pub use health::HealthResponse;
pub use lot::CreateLotRequest;
pub use session::{MessageResponse, ParkingRequest, ENTRY_ALLOWED, EXIT_ALLOWED};

use crate::engine::Engine;
use crate::error::{ApiError, ServiceError};
use parking_db::Store;

/// Command surface over a [`Store`].
///
/// Cheap to clone when the store is; clones share the store.
#[derive(Debug, Clone)]
pub struct ParkingService<S> {
    engine: Engine<S>,
}

impl<S: Store> ParkingService<S> {
    pub fn new(store: S) -> Self {
        ParkingService {
            engine: Engine::new(store),
        }
    }

    pub(crate) fn store(&self) -> &S {
        self.engine.store()
    }

    pub(crate) fn engine(&self) -> &Engine<S> {
        &self.engine
    }
}

/// Converts a failed operation to its API error, logging rejections.
pub(crate) fn reject(operation: &'static str, err: ServiceError) -> ApiError {
    if let ServiceError::Core(core) = &err {
        warn!(operation, kind = ?core.kind(), error = %core, "Request rejected");
    }
    err.into()
}
