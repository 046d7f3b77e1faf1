//! # Entity Store
//!
//! The persistence contract the engine is written against, and its SQLite
//! implementation.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store.begin()          ── BEGIN IMMEDIATE (writer lock taken here)     │
//! │     │                                                                   │
//! │     ├── tx.get_client(id)                                               │
//! │     ├── tx.lock_lot(id)                                                 │
//! │     ├── tx.find_active_session(client, lot)                             │
//! │     │        (snapshot cannot change until commit/rollback)             │
//! │     │                                                                   │
//! │     ├── tx.insert_session / tx.close_session                            │
//! │     ├── tx.update_lot_state                                             │
//! │     │                                                                   │
//! │     └── tx.commit()  or  tx.rollback()  or  drop(tx) = rollback         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{ClientRepository, LotRepository, SessionRepository};
use parking_core::{Client, LotState, NewClient, NewParkingLot, ParkingLot, ParkingSession};

// =============================================================================
// Traits
// =============================================================================

/// Durable storage for clients, lots and sessions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Transaction type produced by [`Store::begin`].
    type Tx: StoreTx;

    /// Starts a transaction with exclusive write access.
    async fn begin(&self) -> DbResult<Self::Tx>;

    async fn insert_client(&self, client: &NewClient) -> DbResult<Client>;

    async fn get_client(&self, id: i64) -> DbResult<Option<Client>>;

    async fn list_clients(&self) -> DbResult<Vec<Client>>;

    /// Inserts a lot in its [`NewParkingLot::initial_state`].
    async fn insert_lot(&self, lot: &NewParkingLot) -> DbResult<ParkingLot>;

    async fn get_lot(&self, id: i64) -> DbResult<Option<ParkingLot>>;

    async fn list_lots(&self) -> DbResult<Vec<ParkingLot>>;

    /// Every session of a client, oldest entry first.
    async fn list_sessions_for_client(&self, client_id: i64) -> DbResult<Vec<ParkingSession>>;
}

/// One all-or-nothing unit of work.
///
/// Nothing written through a transaction is visible to other readers before
/// [`StoreTx::commit`]. Dropping it uncommitted discards every write.
#[async_trait]
pub trait StoreTx: Send {
    async fn get_client(&mut self, id: i64) -> DbResult<Option<Client>>;

    /// Reads a lot that no other transaction can modify until this one ends.
    async fn lock_lot(&mut self, id: i64) -> DbResult<Option<ParkingLot>>;

    async fn find_active_session(
        &mut self,
        client_id: i64,
        lot_id: i64,
    ) -> DbResult<Option<ParkingSession>>;

    /// Opens a session. A second active session for the pair fails with
    /// `DbError::UniqueViolation`.
    async fn insert_session(
        &mut self,
        client_id: i64,
        lot_id: i64,
        time_in: DateTime<Utc>,
    ) -> DbResult<ParkingSession>;

    async fn close_session(&mut self, session_id: i64, time_out: DateTime<Utc>) -> DbResult<()>;

    async fn update_lot_state(&mut self, lot_id: i64, state: LotState) -> DbResult<()>;

    async fn commit(self) -> DbResult<()>;

    async fn rollback(self) -> DbResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// [`Store`] backed by the SQLite [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Store for SqliteStore {
    type Tx = SqliteTx;

    async fn begin(&self) -> DbResult<SqliteTx> {
        let tx = self.db.begin_immediate().await?;
        debug!("Write transaction started");
        Ok(SqliteTx { tx })
    }

    async fn insert_client(&self, client: &NewClient) -> DbResult<Client> {
        self.db.clients().insert(client).await
    }

    async fn get_client(&self, id: i64) -> DbResult<Option<Client>> {
        self.db.clients().get_by_id(id).await
    }

    async fn list_clients(&self) -> DbResult<Vec<Client>> {
        self.db.clients().list().await
    }

    async fn insert_lot(&self, lot: &NewParkingLot) -> DbResult<ParkingLot> {
        self.db.lots().insert(lot).await
    }

    async fn get_lot(&self, id: i64) -> DbResult<Option<ParkingLot>> {
        self.db.lots().get_by_id(id).await
    }

    async fn list_lots(&self) -> DbResult<Vec<ParkingLot>> {
        self.db.lots().list().await
    }

    async fn list_sessions_for_client(&self, client_id: i64) -> DbResult<Vec<ParkingSession>> {
        self.db.sessions().list_for_client(client_id).await
    }
}

/// A `BEGIN IMMEDIATE` transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl StoreTx for SqliteTx {
    async fn get_client(&mut self, id: i64) -> DbResult<Option<Client>> {
        ClientRepository::find(&mut self.tx, id).await
    }

    async fn lock_lot(&mut self, id: i64) -> DbResult<Option<ParkingLot>> {
        // The transaction already holds the database write lock
        LotRepository::find(&mut self.tx, id).await
    }

    async fn find_active_session(
        &mut self,
        client_id: i64,
        lot_id: i64,
    ) -> DbResult<Option<ParkingSession>> {
        SessionRepository::find_active(&mut self.tx, client_id, lot_id).await
    }

    async fn insert_session(
        &mut self,
        client_id: i64,
        lot_id: i64,
        time_in: DateTime<Utc>,
    ) -> DbResult<ParkingSession> {
        SessionRepository::insert(&mut self.tx, client_id, lot_id, time_in).await
    }

    async fn close_session(&mut self, session_id: i64, time_out: DateTime<Utc>) -> DbResult<()> {
        SessionRepository::close(&mut self.tx, session_id, time_out).await
    }

    async fn update_lot_state(&mut self, lot_id: i64, state: LotState) -> DbResult<()> {
        LotRepository::update_state(&mut self.tx, lot_id, state).await
    }

    async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
