//! # Parking API
//!
//! Service layer of the parking backend: the Enter/Exit engine, the command
//! surface, configuration and the error types callers see.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          parking-api                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ ParkingService │  │     Engine     │  │  parking-core              ││
//! │  │                │  │                │  │                            ││
//! │  │ • create_client│  │ • enter        │  │ • plan_entry / plan_exit   ││
//! │  │ • create_lot   │─►│ • exit         │─►│ • LotState transitions     ││
//! │  │ • get / list   │  │                │  │ • validation               ││
//! │  │ • enter / exit │  │ one StoreTx    │  │                            ││
//! │  │ • health       │  │ per request    │  │                            ││
//! │  └────────────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │                              │                                          │
//! │                              ▼                                          │
//! │                 parking-db: SqliteStore | MemoryStore                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PARKING_DB_PATH` - SQLite file, or `:memory:` (default: ./parking.db)
//! - `PARKING_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `PARKING_DB_BUSY_TIMEOUT_MS` - Writer lock wait (default: 5000)
//! - `PARKING_DB_RUN_MIGRATIONS` - Migrate at startup (default: true)
//! - `RUST_LOG` - Log filter (default: info,parking=debug,sqlx=warn)

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;

// Re-exports
pub use commands::ParkingService;
pub use config::{AppConfig, ConfigError};
pub use engine::{Admission, Departure, Engine};
pub use error::{ApiError, ApiResult, ErrorCode, ServiceError, ServiceResult};
