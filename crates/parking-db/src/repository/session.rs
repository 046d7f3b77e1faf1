//! # Parking Session Repository
//!
//! Database operations for parking sessions.
//!
//! ## Active vs Closed
//! ```text
//! time_out IS NULL      → active: the car is in the lot
//! time_out IS NOT NULL  → closed: history, never modified again
//! ```
//!
//! The partial unique index `ux_parking_sessions_active` allows at most one
//! active row per (client_id, lot_id). A duplicate insert surfaces as
//! `DbError::UniqueViolation`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use parking_core::ParkingSession;

const COLUMNS: &str = "id, client_id, lot_id, time_in, time_out";

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Lists every session of a client, oldest entry first.
    ///
    /// Ids are assigned at entry under the writer lock, so id order is
    /// entry order.
    pub async fn list_for_client(&self, client_id: i64) -> DbResult<Vec<ParkingSession>> {
        let sessions = sqlx::query_as::<_, ParkingSession>(&format!(
            "SELECT {COLUMNS} FROM parking_sessions
             WHERE client_id = ?1
             ORDER BY id"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(client_id, count = sessions.len(), "Listed client sessions");
        Ok(sessions)
    }

    /// Counts active sessions in a lot.
    pub async fn count_active_in_lot(&self, lot_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM parking_sessions WHERE lot_id = ?1 AND time_out IS NULL",
        )
        .bind(lot_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Gets the active session for a (client, lot) pair on an existing
    /// connection.
    pub async fn find_active(
        conn: &mut SqliteConnection,
        client_id: i64,
        lot_id: i64,
    ) -> DbResult<Option<ParkingSession>> {
        let session = sqlx::query_as::<_, ParkingSession>(&format!(
            "SELECT {COLUMNS} FROM parking_sessions
             WHERE client_id = ?1 AND lot_id = ?2 AND time_out IS NULL"
        ))
        .bind(client_id)
        .bind(lot_id)
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    /// Opens a session.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the pair already has an active session
    /// * `DbError::ForeignKeyViolation` - client or lot does not exist
    pub async fn insert(
        conn: &mut SqliteConnection,
        client_id: i64,
        lot_id: i64,
        time_in: DateTime<Utc>,
    ) -> DbResult<ParkingSession> {
        let session = sqlx::query_as::<_, ParkingSession>(&format!(
            "INSERT INTO parking_sessions (client_id, lot_id, time_in, time_out)
             VALUES (?1, ?2, ?3, NULL)
             RETURNING {COLUMNS}"
        ))
        .bind(client_id)
        .bind(lot_id)
        .bind(time_in)
        .fetch_one(conn)
        .await?;

        debug!(session_id = session.id, client_id, lot_id, "Session opened");
        Ok(session)
    }

    /// Closes an active session.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such session, or it is already closed
    pub async fn close(
        conn: &mut SqliteConnection,
        session_id: i64,
        time_out: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE parking_sessions SET time_out = ?1 WHERE id = ?2 AND time_out IS NULL",
        )
        .bind(time_out)
        .bind(session_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ParkingSession", session_id));
        }

        debug!(session_id, "Session closed");
        Ok(())
    }
}
