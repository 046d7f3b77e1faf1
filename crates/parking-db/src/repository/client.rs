//! # Client Repository
//!
//! Database operations for clients.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use parking_core::{Client, NewClient};

const COLUMNS: &str = "id, name, surname, payment_credential, plate";

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Inserts a client and returns it with its assigned id.
    ///
    /// The input is stored as given; validation happens before this call.
    pub async fn insert(&self, client: &NewClient) -> DbResult<Client> {
        let created = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients (name, surname, payment_credential, plate)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        ))
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.payment_credential)
        .bind(&client.plate)
        .fetch_one(&self.pool)
        .await?;

        debug!(client_id = created.id, "Client inserted");
        Ok(created)
    }

    /// Gets a client by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        Self::find(&mut conn, id).await
    }

    /// Lists all clients in id order.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients =
            sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM clients ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(clients)
    }

    /// Gets a client by id on an existing connection.
    pub async fn find(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Client>> {
        let client =
            sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM clients WHERE id = ?1"))
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use parking_core::NewClient;

    fn luke() -> NewClient {
        NewClient {
            name: "Luke".to_string(),
            surname: "Skywalker".to_string(),
            payment_credential: Some("4111-0000-0000-0001".to_string()),
            plate: "M001MM186".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let created = repo.insert(&luke()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "Luke");

        let loaded = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);

        assert!(repo.get_by_id(created.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_credential_round_trips() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let mut input = luke();
        input.payment_credential = None;
        let created = repo.insert(&input).await.unwrap();

        let loaded = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_credential, None);
        assert!(!loaded.can_pay());
    }

    #[tokio::test]
    async fn test_list_in_id_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let first = repo.insert(&luke()).await.unwrap();
        let second = repo.insert(&luke()).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
