//! # parking-db: Persistence for the Parking Backend
//!
//! SQLite storage for clients, lots and parking sessions, plus the `Store`
//! abstraction the engine runs its transactions through.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Parking Data Flow                                 │
//! │                                                                         │
//! │  ParkingService::enter / exit (parking-api)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   parking-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ Store/StoreTx │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │───►│ client / lot  │    │  (embedded)  │  │   │
//! │  │   │               │    │ session       │    │              │  │   │
//! │  │   │ SqliteStore   │    └───────┬───────┘    │ 001_init.sql │  │   │
//! │  │   │ MemoryStore   │            │            └──────────────┘  │   │
//! │  │   └───────────────┘            ▼                               │   │
//! │  │                        Database (pool.rs)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)  or  :memory:                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQL per table
//! - [`store`] - `Store` / `StoreTx` traits and the SQLite implementation
//! - [`memory`] - In-process store for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parking_db::{Database, DbConfig, SqliteStore, Store, StoreTx};
//!
//! let db = Database::new(DbConfig::new("parking.db")).await?;
//! let store = SqliteStore::new(db);
//!
//! let mut tx = store.begin().await?;
//! let lot = tx.lock_lot(1).await?;
//! // ...
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::{MemoryStore, MemoryTx};
pub use pool::{Database, DbConfig};
pub use store::{SqliteStore, SqliteTx, Store, StoreTx};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::lot::LotRepository;
pub use repository::session::SessionRepository;
