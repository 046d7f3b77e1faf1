//! # Parking Lot Repository
//!
//! Database operations for lots.
//!
//! `opened` and `available_places` are written only through
//! [`LotRepository::update_state`], inside the same transaction as the
//! session row that justifies the change. The table's CHECK constraints
//! reject any write that would leave `available_places` outside
//! `0..=total_places`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use parking_core::{LotState, NewParkingLot, ParkingLot};

const COLUMNS: &str = "id, address, opened, total_places, available_places";

/// Repository for lot database operations.
#[derive(Debug, Clone)]
pub struct LotRepository {
    pool: SqlitePool,
}

impl LotRepository {
    /// Creates a new LotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LotRepository { pool }
    }

    /// Inserts a lot in its initial state and returns it with its id.
    pub async fn insert(&self, lot: &NewParkingLot) -> DbResult<ParkingLot> {
        let state = lot.initial_state();

        let created = sqlx::query_as::<_, ParkingLot>(&format!(
            "INSERT INTO parking_lots (address, opened, total_places, available_places)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        ))
        .bind(&lot.address)
        .bind(state.opened)
        .bind(state.total_places)
        .bind(state.available_places)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            lot_id = created.id,
            total_places = created.total_places,
            opened = created.opened,
            "Lot inserted"
        );
        Ok(created)
    }

    /// Gets a lot by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ParkingLot>> {
        let mut conn = self.pool.acquire().await?;
        Self::find(&mut conn, id).await
    }

    /// Lists all lots in id order.
    pub async fn list(&self) -> DbResult<Vec<ParkingLot>> {
        let lots = sqlx::query_as::<_, ParkingLot>(&format!(
            "SELECT {COLUMNS} FROM parking_lots ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(lots)
    }

    /// Gets a lot by id on an existing connection.
    pub async fn find(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<ParkingLot>> {
        let lot = sqlx::query_as::<_, ParkingLot>(&format!(
            "SELECT {COLUMNS} FROM parking_lots WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(lot)
    }

    /// Writes a new capacity state onto a lot.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no lot with this id
    /// * `DbError::CheckViolation` - state outside the lot's bounds
    pub async fn update_state(
        conn: &mut SqliteConnection,
        id: i64,
        state: LotState,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE parking_lots SET opened = ?1, available_places = ?2 WHERE id = ?3",
        )
        .bind(state.opened)
        .bind(state.available_places)
        .bind(id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ParkingLot", id));
        }

        debug!(
            lot_id = id,
            opened = state.opened,
            available_places = state.available_places,
            "Lot state updated"
        );
        Ok(())
    }
}
