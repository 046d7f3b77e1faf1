//! # Session Lifecycle Engine
//!
//! Runs Enter and Exit as single store transactions.
//!
//! ## Enter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin ──► get_client ──► lock_lot ──► find_active_session              │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                              plan_entry (pure, parking-core)            │
//! │                                 │                  │                    │
//! │                               Err                  Ok                   │
//! │                                 │                  │                    │
//! │                                 ▼                  ▼                    │
//! │                             rollback      insert_session                │
//! │                                           update_lot_state ──► commit   │
//! │                                                                         │
//! │  Any store failure after begin ──► rollback ──► Persistence             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check reads inside the transaction, so two requests for the same
//! lot never act on the same snapshot.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use parking_core::lifecycle::{plan_entry, plan_exit};
use parking_core::{CoreError, LotState, ParkingSession};
use parking_db::{Store, StoreTx};

/// A committed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// The session that was opened.
    pub session: ParkingSession,
    /// The lot's state after the entry.
    pub lot: LotState,
}

/// A committed exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The session that was closed, `time_out` set.
    pub session: ParkingSession,
    /// The lot's state after the exit, or `None` if the lot no longer exists.
    pub lot: Option<LotState>,
}

/// Stateless executor of the Enter and Exit transitions.
#[derive(Debug, Clone)]
pub struct Engine<S> {
    store: S,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Engine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Admits a client's vehicle into a lot.
    pub async fn enter(&self, client_id: i64, lot_id: i64) -> ServiceResult<Admission> {
        let mut tx = self.store.begin().await?;

        let result = enter_in(&mut tx, client_id, lot_id).await;
        let admission = match result {
            Ok(admission) => admission,
            Err(err) => return Err(abort(tx, err).await),
        };

        tx.commit().await?;

        info!(
            client_id,
            lot_id,
            session_id = admission.session.id,
            available_places = admission.lot.available_places,
            "Entry allowed"
        );
        Ok(admission)
    }

    /// Closes a client's active session in a lot and frees the place.
    pub async fn exit(&self, client_id: i64, lot_id: i64) -> ServiceResult<Departure> {
        let mut tx = self.store.begin().await?;

        let result = exit_in(&mut tx, client_id, lot_id).await;
        let departure = match result {
            Ok(departure) => departure,
            Err(err) => return Err(abort(tx, err).await),
        };

        tx.commit().await?;

        info!(
            client_id,
            lot_id,
            session_id = departure.session.id,
            lot_updated = departure.lot.is_some(),
            "Exit allowed"
        );
        Ok(departure)
    }
}

async fn enter_in<T: StoreTx>(tx: &mut T, client_id: i64, lot_id: i64) -> ServiceResult<Admission> {
    let client = tx.get_client(client_id).await?;
    let lot = tx.lock_lot(lot_id).await?;
    let active = tx.find_active_session(client_id, lot_id).await?;

    let plan = plan_entry(client_id, lot_id, client.as_ref(), lot.as_ref(), active.as_ref())?;
    debug!(?plan, "Entry planned");

    let session = match tx.insert_session(plan.client_id, plan.lot_id, Utc::now()).await {
        Ok(session) => session,
        // A concurrent entry got there first
        Err(err) if err.is_unique_violation() => {
            return Err(CoreError::AlreadyParked { client_id, lot_id }.into())
        }
        Err(err) => return Err(err.into()),
    };

    tx.update_lot_state(plan.lot_id, plan.lot_state).await?;

    Ok(Admission {
        session,
        lot: plan.lot_state,
    })
}

async fn exit_in<T: StoreTx>(tx: &mut T, client_id: i64, lot_id: i64) -> ServiceResult<Departure> {
    let client = tx.get_client(client_id).await?;
    let active = tx.find_active_session(client_id, lot_id).await?;
    let lot = tx.lock_lot(lot_id).await?;

    let plan = plan_exit(client_id, lot_id, client.as_ref(), active.as_ref(), lot.as_ref())?;
    debug!(?plan, "Exit planned");
    if plan.capacity_clamped {
        warn!(
            client_id,
            lot_id,
            session_id = plan.session_id,
            "Lot shows every place free during an exit; available_places kept at total"
        );
    }

    let mut session = active.ok_or(CoreError::SessionNotFound { client_id, lot_id })?;
    let time_out = session.exit_time(Utc::now());

    tx.close_session(plan.session_id, time_out).await?;
    session.time_out = Some(time_out);

    if let Some((id, state)) = plan.lot {
        tx.update_lot_state(id, state).await?;
    }

    Ok(Departure {
        session,
        lot: plan.lot.map(|(_, state)| state),
    })
}

/// Rolls back after a failed step and returns the step's error.
async fn abort<T: StoreTx>(tx: T, err: ServiceError) -> ServiceError {
    if let Err(rollback_err) = tx.rollback().await {
        warn!(error = %rollback_err, "Rollback failed; transaction dropped");
    }
    err
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_core::{Client, NewClient, NewParkingLot, ParkingLot};
    use parking_db::MemoryStore;

    async fn client(store: &MemoryStore, credential: Option<&str>) -> Client {
        store
            .insert_client(&NewClient {
                name: "Din".to_string(),
                surname: "Djarin".to_string(),
                payment_credential: credential.map(str::to_string),
                plate: "RAZOR1".to_string(),
            })
            .await
            .unwrap()
    }

    async fn lot(store: &MemoryStore, opened: bool, total: i64, available: i64) -> ParkingLot {
        store
            .insert_lot(&NewParkingLot {
                address: "Nevarro Covert".to_string(),
                opened,
                total_places: total,
                available_places: available,
            })
            .await
            .unwrap()
    }

    fn core_err(err: ServiceError) -> CoreError {
        match err {
            ServiceError::Core(e) => e,
            ServiceError::Persistence(e) => panic!("unexpected persistence error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_enter_takes_last_place_and_closes() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 1, 1).await;
        let engine = Engine::new(store.clone());

        let admission = engine.enter(c.id, l.id).await.unwrap();
        assert!(admission.session.is_active());
        assert_eq!(admission.lot.available_places, 0);
        assert!(!admission.lot.opened);

        let stored = store.get_lot(l.id).await.unwrap().unwrap();
        assert_eq!(stored.available_places, 0);
        assert!(!stored.opened);
    }

    #[tokio::test]
    async fn test_enter_check_order() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let closed = lot(&store, false, 5, 5).await;
        let engine = Engine::new(store.clone());

        assert!(matches!(
            core_err(engine.enter(99, 98).await.unwrap_err()),
            CoreError::ClientNotFound(99)
        ));
        assert!(matches!(
            core_err(engine.enter(c.id, 98).await.unwrap_err()),
            CoreError::LotNotFound(98)
        ));
        assert!(matches!(
            core_err(engine.enter(c.id, closed.id).await.unwrap_err()),
            CoreError::LotClosed(_)
        ));
    }

    #[tokio::test]
    async fn test_enter_full_open_lot() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 2, 2).await;
        let engine = Engine::new(store.clone());

        // Force an opened lot with no places, as left by an out-of-band edit
        let mut tx = store.begin().await.unwrap();
        tx.update_lot_state(
            l.id,
            LotState {
                opened: true,
                total_places: 2,
                available_places: 0,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert!(matches!(
            core_err(engine.enter(c.id, l.id).await.unwrap_err()),
            CoreError::LotFull(_)
        ));
    }

    #[tokio::test]
    async fn test_second_enter_is_already_parked() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 5, 5).await;
        let engine = Engine::new(store.clone());

        engine.enter(c.id, l.id).await.unwrap();
        assert!(matches!(
            core_err(engine.enter(c.id, l.id).await.unwrap_err()),
            CoreError::AlreadyParked { .. }
        ));

        // The rejected entry changed nothing
        let stored = store.get_lot(l.id).await.unwrap().unwrap();
        assert_eq!(stored.available_places, 4);
        assert_eq!(store.count_active_in_lot(l.id).await, 1);
    }

    #[tokio::test]
    async fn test_failed_session_insert_rolls_back() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 3, 3).await;
        let engine = Engine::new(store.clone());

        store.fail_next_session_insert();
        let err = engine.enter(c.id, l.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));

        let stored = store.get_lot(l.id).await.unwrap().unwrap();
        assert_eq!(stored.available_places, 3);
        assert_eq!(store.count_active_in_lot(l.id).await, 0);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_trace() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 3, 3).await;
        let engine = Engine::new(store.clone());

        store.fail_next_commit();
        assert!(matches!(
            engine.enter(c.id, l.id).await.unwrap_err(),
            ServiceError::Persistence(_)
        ));
        assert_eq!(store.count_active_in_lot(l.id).await, 0);

        // Retry succeeds
        engine.enter(c.id, l.id).await.unwrap();
        assert_eq!(store.count_active_in_lot(l.id).await, 1);
    }

    #[tokio::test]
    async fn test_exit_frees_place_and_reopens() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 1, 1).await;
        let engine = Engine::new(store.clone());

        let admission = engine.enter(c.id, l.id).await.unwrap();
        let departure = engine.exit(c.id, l.id).await.unwrap();

        assert_eq!(departure.session.id, admission.session.id);
        let time_out = departure.session.time_out.unwrap();
        assert!(time_out >= departure.session.time_in);

        let state = departure.lot.unwrap();
        assert_eq!(state.available_places, 1);
        assert!(state.opened);
        assert_eq!(store.get_lot(l.id).await.unwrap().unwrap().state(), state);
    }

    #[tokio::test]
    async fn test_exit_without_payment_method() {
        let store = MemoryStore::new();
        let c = client(&store, None).await;
        let l = lot(&store, true, 3, 3).await;
        let engine = Engine::new(store.clone());

        engine.enter(c.id, l.id).await.unwrap();
        assert!(matches!(
            core_err(engine.exit(c.id, l.id).await.unwrap_err()),
            CoreError::NoPaymentMethod(_)
        ));

        assert_eq!(store.count_active_in_lot(l.id).await, 1);
        assert_eq!(store.get_lot(l.id).await.unwrap().unwrap().available_places, 2);
    }

    #[tokio::test]
    async fn test_exit_without_session() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 3, 3).await;
        let engine = Engine::new(store);

        assert!(matches!(
            core_err(engine.exit(c.id, l.id).await.unwrap_err()),
            CoreError::SessionNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_exit_reopens_forced_closed_lot() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 3, 3).await;
        let engine = Engine::new(store.clone());

        engine.enter(c.id, l.id).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.update_lot_state(
            l.id,
            LotState {
                opened: false,
                total_places: 3,
                available_places: 2,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let departure = engine.exit(c.id, l.id).await.unwrap();
        assert!(departure.lot.unwrap().opened);
    }

    #[tokio::test]
    async fn test_exit_from_lot_with_no_occupied_place_keeps_bounds() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        let l = lot(&store, true, 2, 2).await;
        store.insert_orphan_session(c.id, l.id, Utc::now()).await;
        let engine = Engine::new(store.clone());

        let departure = engine.exit(c.id, l.id).await.unwrap();
        assert!(!departure.session.is_active());
        assert_eq!(departure.lot, Some(l.state()));
        assert_eq!(store.get_lot(l.id).await.unwrap().unwrap().available_places, 2);
    }

    #[tokio::test]
    async fn test_exit_when_lot_is_gone() {
        let store = MemoryStore::new();
        let c = client(&store, Some("card")).await;
        store.insert_orphan_session(c.id, 77, Utc::now()).await;
        let engine = Engine::new(store.clone());

        let departure = engine.exit(c.id, 77).await.unwrap();
        assert!(departure.lot.is_none());
        assert!(!departure.session.is_active());

        let history = store.list_sessions_for_client(c.id).await.unwrap();
        assert!(history.iter().all(|s| !s.is_active()));
    }
}
