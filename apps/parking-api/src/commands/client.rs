//! # Client Commands

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{reject, ParkingService};
use crate::error::{ApiResult, ServiceError};
use parking_core::validation::{validate_id, validate_new_client};
use parking_core::{Client, CoreError, NewClient, ParkingSession};
use parking_db::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub payment_credential: Option<String>,
    pub plate: String,
}

impl From<CreateClientRequest> for NewClient {
    fn from(req: CreateClientRequest) -> Self {
        NewClient {
            name: req.name,
            surname: req.surname,
            payment_credential: req.payment_credential,
            plate: req.plate,
        }
    }
}

impl<S: Store> ParkingService<S> {
    /// Registers a client.
    pub async fn create_client(&self, req: CreateClientRequest) -> ApiResult<Client> {
        debug!("create_client command");

        let client = validate_new_client(req.into())
            .map_err(|e| reject("create_client", e.into()))?;

        let created = self
            .store()
            .insert_client(&client)
            .await
            .map_err(|e| reject("create_client", e.into()))?;

        info!(client_id = created.id, "Client registered");
        Ok(created)
    }

    /// Gets a client by id.
    pub async fn get_client(&self, id: i64) -> ApiResult<Client> {
        debug!(id, "get_client command");
        self.find_client(id)
            .await
            .map_err(|e| reject("get_client", e))
    }

    /// Lists all clients.
    pub async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        debug!("list_clients command");
        self.store()
            .list_clients()
            .await
            .map_err(|e| reject("list_clients", e.into()))
    }

    /// Lists a client's sessions, oldest first.
    pub async fn list_client_sessions(&self, client_id: i64) -> ApiResult<Vec<ParkingSession>> {
        debug!(client_id, "list_client_sessions command");

        let sessions = async {
            self.find_client(client_id).await?;
            Ok::<_, ServiceError>(self.store().list_sessions_for_client(client_id).await?)
        }
        .await
        .map_err(|e| reject("list_client_sessions", e))?;

        Ok(sessions)
    }

    async fn find_client(&self, id: i64) -> Result<Client, ServiceError> {
        validate_id("client_id", id)?;
        self.store()
            .get_client(id)
            .await?
            .ok_or_else(|| CoreError::ClientNotFound(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use parking_db::MemoryStore;

    fn request() -> CreateClientRequest {
        CreateClientRequest {
            name: " Ahsoka ".to_string(),
            surname: "Tano".to_string(),
            payment_credential: Some("snips-card".to_string()),
            plate: "TGRUTA".to_string(),
        }
    }

    #[test]
    fn test_request_camel_case() {
        let req: CreateClientRequest = serde_json::from_value(serde_json::json!({
            "name": "Ahsoka",
            "surname": "Tano",
            "paymentCredential": "card",
            "plate": "TGRUTA"
        }))
        .unwrap();
        assert_eq!(req.payment_credential.as_deref(), Some("card"));

        let req: CreateClientRequest = serde_json::from_value(serde_json::json!({
            "name": "Ahsoka",
            "surname": "Tano",
            "plate": "TGRUTA"
        }))
        .unwrap();
        assert!(req.payment_credential.is_none());
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = ParkingService::new(MemoryStore::new());

        let created = service.create_client(request()).await.unwrap();
        assert_eq!(created.name, "Ahsoka");

        let loaded = service.get_client(created.id).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(service.list_clients().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_rejects_long_plate() {
        let service = ParkingService::new(MemoryStore::new());

        let mut req = request();
        req.plate = "P".repeat(11);
        let err = service.create_client(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status, 422);
        assert!(service.list_clients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_and_invalid_ids() {
        let service = ParkingService::new(MemoryStore::new());

        let err = service.get_client(5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = service.get_client(0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = service.list_client_sessions(5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
