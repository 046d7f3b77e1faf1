//! # In-Memory Store
//!
//! A [`Store`] that keeps everything in process memory. Used by engine and
//! service tests that need to run without SQLite or need to make a write fail
//! on demand.
//!
//! ```text
//! begin()  ── lock whole state (owned guard) ── clone into `staged`
//! tx ops   ── read/write `staged` only
//! commit() ── write `staged` back through the guard, release
//! drop     ── release, `staged` discarded
//! ```
//!
//! Only one transaction exists at a time, which gives the same
//! serialization as `BEGIN IMMEDIATE`. The constraints the SQLite schema
//! enforces (foreign keys, capacity CHECKs, one active session per pair)
//! are checked here too.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{DbError, DbResult};
use crate::store::{Store, StoreTx};
use parking_core::{Client, LotState, NewClient, NewParkingLot, ParkingLot, ParkingSession};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    clients: BTreeMap<i64, Client>,
    lots: BTreeMap<i64, ParkingLot>,
    sessions: BTreeMap<i64, ParkingSession>,
    last_client_id: i64,
    last_lot_id: i64,
    last_session_id: i64,
}

impl MemoryState {
    fn active_session(&self, client_id: i64, lot_id: i64) -> Option<&ParkingSession> {
        self.sessions
            .values()
            .find(|s| s.client_id == client_id && s.lot_id == lot_id && s.is_active())
    }

    fn push_session(&mut self, client_id: i64, lot_id: i64, time_in: DateTime<Utc>) -> ParkingSession {
        self.last_session_id += 1;
        let session = ParkingSession {
            id: self.last_session_id,
            client_id,
            lot_id,
            time_in,
            time_out: None,
        };
        self.sessions.insert(session.id, session.clone());
        session
    }
}

/// Armed failures, consumed by the next matching operation.
#[derive(Debug, Default)]
struct Faults {
    session_insert: AtomicBool,
    commit: AtomicBool,
}

/// In-process [`Store`] with failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `insert_session` fail with a query error.
    pub fn fail_next_session_insert(&self) {
        self.faults.session_insert.store(true, Ordering::SeqCst);
    }

    /// Makes the next `commit` fail; the transaction's writes are discarded.
    pub fn fail_next_commit(&self) {
        self.faults.commit.store(true, Ordering::SeqCst);
    }

    /// Stores an active session for a pair without checking that the client
    /// or the lot exists.
    ///
    /// Reproduces rows left behind when a lot is removed out of band.
    pub async fn insert_orphan_session(
        &self,
        client_id: i64,
        lot_id: i64,
        time_in: DateTime<Utc>,
    ) -> ParkingSession {
        self.state.lock().await.push_session(client_id, lot_id, time_in)
    }

    /// Active sessions in a lot.
    pub async fn count_active_in_lot(&self, lot_id: i64) -> i64 {
        self.state
            .lock()
            .await
            .sessions
            .values()
            .filter(|s| s.lot_id == lot_id && s.is_active())
            .count() as i64
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> DbResult<MemoryTx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = MemoryState::clone(&guard);
        Ok(MemoryTx {
            guard,
            staged,
            faults: Arc::clone(&self.faults),
        })
    }

    async fn insert_client(&self, client: &NewClient) -> DbResult<Client> {
        let mut state = self.state.lock().await;
        state.last_client_id += 1;
        let created = Client {
            id: state.last_client_id,
            name: client.name.clone(),
            surname: client.surname.clone(),
            payment_credential: client.payment_credential.clone(),
            plate: client.plate.clone(),
        };
        state.clients.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_client(&self, id: i64) -> DbResult<Option<Client>> {
        Ok(self.state.lock().await.clients.get(&id).cloned())
    }

    async fn list_clients(&self) -> DbResult<Vec<Client>> {
        Ok(self.state.lock().await.clients.values().cloned().collect())
    }

    async fn insert_lot(&self, lot: &NewParkingLot) -> DbResult<ParkingLot> {
        let initial = lot.initial_state();
        check_capacity(initial)?;

        let mut state = self.state.lock().await;
        state.last_lot_id += 1;
        let created = ParkingLot {
            id: state.last_lot_id,
            address: lot.address.clone(),
            opened: initial.opened,
            total_places: initial.total_places,
            available_places: initial.available_places,
        };
        state.lots.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_lot(&self, id: i64) -> DbResult<Option<ParkingLot>> {
        Ok(self.state.lock().await.lots.get(&id).cloned())
    }

    async fn list_lots(&self) -> DbResult<Vec<ParkingLot>> {
        Ok(self.state.lock().await.lots.values().cloned().collect())
    }

    async fn list_sessions_for_client(&self, client_id: i64) -> DbResult<Vec<ParkingSession>> {
        Ok(self
            .state
            .lock()
            .await
            .sessions
            .values()
            .filter(|s| s.client_id == client_id)
            .cloned()
            .collect())
    }
}

/// Transaction over a [`MemoryStore`]. Holds the store lock until it ends.
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    faults: Arc<Faults>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn get_client(&mut self, id: i64) -> DbResult<Option<Client>> {
        Ok(self.staged.clients.get(&id).cloned())
    }

    async fn lock_lot(&mut self, id: i64) -> DbResult<Option<ParkingLot>> {
        Ok(self.staged.lots.get(&id).cloned())
    }

    async fn find_active_session(
        &mut self,
        client_id: i64,
        lot_id: i64,
    ) -> DbResult<Option<ParkingSession>> {
        Ok(self.staged.active_session(client_id, lot_id).cloned())
    }

    async fn insert_session(
        &mut self,
        client_id: i64,
        lot_id: i64,
        time_in: DateTime<Utc>,
    ) -> DbResult<ParkingSession> {
        if self.faults.session_insert.swap(false, Ordering::SeqCst) {
            return Err(DbError::QueryFailed("injected session insert failure".to_string()));
        }
        if !self.staged.clients.contains_key(&client_id) || !self.staged.lots.contains_key(&lot_id)
        {
            return Err(DbError::ForeignKeyViolation {
                message: format!("session ({client_id}, {lot_id}) references a missing row"),
            });
        }
        if self.staged.active_session(client_id, lot_id).is_some() {
            return Err(DbError::duplicate(
                "parking_sessions.client_id, parking_sessions.lot_id",
                format!("{client_id}, {lot_id}"),
            ));
        }

        Ok(self.staged.push_session(client_id, lot_id, time_in))
    }

    async fn close_session(&mut self, session_id: i64, time_out: DateTime<Utc>) -> DbResult<()> {
        match self.staged.sessions.get_mut(&session_id) {
            Some(session) if session.is_active() => {
                session.time_out = Some(time_out);
                Ok(())
            }
            _ => Err(DbError::not_found("ParkingSession", session_id)),
        }
    }

    async fn update_lot_state(&mut self, lot_id: i64, state: LotState) -> DbResult<()> {
        let lot = self
            .staged
            .lots
            .get_mut(&lot_id)
            .ok_or_else(|| DbError::not_found("ParkingLot", lot_id))?;
        check_capacity(LotState {
            total_places: lot.total_places,
            ..state
        })?;
        lot.opened = state.opened;
        lot.available_places = state.available_places;
        Ok(())
    }

    async fn commit(self) -> DbResult<()> {
        let MemoryTx {
            mut guard,
            staged,
            faults,
        } = self;

        if faults.commit.swap(false, Ordering::SeqCst) {
            return Err(DbError::TransactionFailed("injected commit failure".to_string()));
        }

        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        Ok(())
    }
}

fn check_capacity(state: LotState) -> DbResult<()> {
    if state.total_places < 0
        || state.available_places < 0
        || state.available_places > state.total_places
    {
        return Err(DbError::CheckViolation {
            message: format!(
                "available_places {} outside 0..={}",
                state.available_places, state.total_places
            ),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Client, ParkingLot) {
        let store = MemoryStore::new();
        let client = store
            .insert_client(&NewClient {
                name: "Obi-Wan".to_string(),
                surname: "Kenobi".to_string(),
                payment_credential: Some("tatooine".to_string()),
                plate: "BEN01".to_string(),
            })
            .await
            .unwrap();
        let lot = store
            .insert_lot(&NewParkingLot {
                address: "Dune Sea".to_string(),
                opened: true,
                total_places: 2,
                available_places: 2,
            })
            .await
            .unwrap();
        (store, client, lot)
    }

    #[tokio::test]
    async fn test_commit_publishes() {
        let (store, client, lot) = seeded().await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_session(client.id, lot.id, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.count_active_in_lot(lot.id).await, 1);
    }

    #[tokio::test]
    async fn test_drop_discards() {
        let (store, client, lot) = seeded().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_session(client.id, lot.id, Utc::now()).await.unwrap();
        }

        assert_eq!(store.count_active_in_lot(lot.id).await, 0);
    }

    #[tokio::test]
    async fn test_injected_commit_failure_discards_and_disarms() {
        let (store, client, lot) = seeded().await;
        store.fail_next_commit();

        let mut tx = store.begin().await.unwrap();
        tx.insert_session(client.id, lot.id, Utc::now()).await.unwrap();
        assert!(matches!(
            tx.commit().await,
            Err(DbError::TransactionFailed(_))
        ));
        assert_eq!(store.count_active_in_lot(lot.id).await, 0);

        let mut tx = store.begin().await.unwrap();
        tx.insert_session(client.id, lot.id, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.count_active_in_lot(lot.id).await, 1);
    }

    #[tokio::test]
    async fn test_constraints_match_schema() {
        let (store, client, lot) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        tx.insert_session(client.id, lot.id, Utc::now()).await.unwrap();
        let dup = tx.insert_session(client.id, lot.id, Utc::now()).await;
        assert!(dup.unwrap_err().is_unique_violation());

        let fk = tx.insert_session(client.id, 999, Utc::now()).await;
        assert!(matches!(fk, Err(DbError::ForeignKeyViolation { .. })));

        let over = tx
            .update_lot_state(
                lot.id,
                LotState {
                    opened: true,
                    total_places: 2,
                    available_places: 3,
                },
            )
            .await;
        assert!(matches!(over, Err(DbError::CheckViolation { .. })));
    }

    #[tokio::test]
    async fn test_orphan_session_bypasses_foreign_keys() {
        let (store, client, _) = seeded().await;
        let orphan = store.insert_orphan_session(client.id, 42, Utc::now()).await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx.lock_lot(42).await.unwrap().is_none());
        let found = tx.find_active_session(client.id, 42).await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(orphan.id));
    }
}
