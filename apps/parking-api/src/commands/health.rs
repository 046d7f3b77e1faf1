//! # Health Command
//!
//! Only available over SQLite: it reports on the database itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ParkingService;
use crate::error::ApiResult;
use parking_db::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` or `"unavailable"`
    pub database: String,
    pub migrations_total: usize,
    pub migrations_applied: usize,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.database == "ok" && self.migrations_applied == self.migrations_total
    }
}

impl ParkingService<SqliteStore> {
    /// Checks that the database answers and the schema is current.
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        debug!("health command");

        let db = self.store().database();
        if !db.health_check().await {
            return Ok(HealthResponse {
                database: "unavailable".to_string(),
                migrations_total: 0,
                migrations_applied: 0,
            });
        }

        let (total, applied) = db.migration_status().await?;
        Ok(HealthResponse {
            database: "ok".to_string(),
            migrations_total: total,
            migrations_applied: applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_health_after_migrations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = ParkingService::new(SqliteStore::new(db));

        let health = service.health().await.unwrap();
        assert_eq!(health.database, "ok");
        assert!(health.is_healthy());
    }

    #[tokio::test]
    async fn test_health_reports_pending_migrations() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let service = ParkingService::new(SqliteStore::new(db));

        let health = service.health().await.unwrap();
        assert_eq!(health.migrations_applied, 0);
        assert!(!health.is_healthy());
    }

    #[tokio::test]
    async fn test_health_on_closed_pool() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        let service = ParkingService::new(SqliteStore::new(db));

        let health = service.health().await.unwrap();
        assert_eq!(health.database, "unavailable");
    }
}
