//! # Session Commands
//!
//! Entry and exit. Both run entirely inside the engine's transaction; this
//! layer only validates ids and shapes the reply.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{reject, ParkingService};
use crate::error::{ApiResult, ServiceError};
use parking_core::validation::validate_id;
use parking_db::Store;

/// Reply message for a successful entry.
pub const ENTRY_ALLOWED: &str = "Entry allowed";

/// Reply message for a successful exit.
pub const EXIT_ALLOWED: &str = "Payment completed, exit allowed";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingRequest {
    pub client_id: i64,
    pub lot_id: i64,
}

impl ParkingRequest {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_id("client_id", self.client_id)?;
        validate_id("lot_id", self.lot_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl<S: Store> ParkingService<S> {
    /// Admits a vehicle.
    pub async fn enter(&self, req: ParkingRequest) -> ApiResult<MessageResponse> {
        debug!(client_id = req.client_id, lot_id = req.lot_id, "enter command");

        let result = async {
            req.validate()?;
            self.engine().enter(req.client_id, req.lot_id).await
        }
        .await;

        result.map_err(|e| reject("enter", e))?;
        Ok(MessageResponse {
            message: ENTRY_ALLOWED.to_string(),
        })
    }

    /// Settles payment and lets a vehicle leave.
    pub async fn exit(&self, req: ParkingRequest) -> ApiResult<MessageResponse> {
        debug!(client_id = req.client_id, lot_id = req.lot_id, "exit command");

        let result = async {
            req.validate()?;
            self.engine().exit(req.client_id, req.lot_id).await
        }
        .await;

        result.map_err(|e| reject("exit", e))?;
        Ok(MessageResponse {
            message: EXIT_ALLOWED.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CreateClientRequest, CreateLotRequest};
    use crate::error::ErrorCode;
    use parking_db::MemoryStore;

    async fn setup(credential: Option<&str>, places: i64) -> (ParkingService<MemoryStore>, ParkingRequest) {
        let service = ParkingService::new(MemoryStore::new());
        let client = service
            .create_client(CreateClientRequest {
                name: "Boba".to_string(),
                surname: "Fett".to_string(),
                payment_credential: credential.map(str::to_string),
                plate: "SLAVE1".to_string(),
            })
            .await
            .unwrap();
        let lot = service
            .create_lot(CreateLotRequest {
                address: "Jabba's Palace".to_string(),
                opened: true,
                total_places: places,
                available_places: None,
            })
            .await
            .unwrap();
        let req = ParkingRequest {
            client_id: client.id,
            lot_id: lot.id,
        };
        (service, req)
    }

    #[tokio::test]
    async fn test_enter_then_exit_messages() {
        let (service, req) = setup(Some("bounty"), 2).await;

        assert_eq!(service.enter(req).await.unwrap().message, "Entry allowed");
        assert_eq!(
            service.exit(req).await.unwrap().message,
            "Payment completed, exit allowed"
        );

        let lot = service.get_lot(req.lot_id).await.unwrap();
        assert_eq!(lot.available_places, 2);
        assert!(lot.opened);
    }

    #[tokio::test]
    async fn test_rejections_map_to_codes() {
        let (service, req) = setup(None, 1).await;

        service.enter(req).await.unwrap();

        let err = service.enter(req).await.unwrap_err();
        // The single place is taken, so the lot closed before the duplicate check
        assert_eq!(err.code, ErrorCode::LotClosed);

        let err = service.exit(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoPaymentMethod);
        assert_eq!(err.status, 400);
    }

    #[tokio::test]
    async fn test_already_parked() {
        let (service, req) = setup(Some("bounty"), 3).await;

        service.enter(req).await.unwrap();
        let err = service.enter(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyParked);
    }

    #[tokio::test]
    async fn test_exit_without_session_is_not_found() {
        let (service, req) = setup(Some("bounty"), 3).await;

        let err = service.exit(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_invalid_ids_are_validation_errors() {
        let (service, _) = setup(Some("bounty"), 3).await;

        let err = service
            .enter(ParkingRequest {
                client_id: -1,
                lot_id: 1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status, 422);
    }

    #[tokio::test]
    async fn test_history_records_each_visit() {
        let (service, req) = setup(Some("bounty"), 3).await;

        for _ in 0..2 {
            service.enter(req).await.unwrap();
            service.exit(req).await.unwrap();
        }
        service.enter(req).await.unwrap();

        let history = service.list_client_sessions(req.client_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().filter(|s| s.is_active()).count(), 1);
    }
}
