//! # Lot Commands

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{reject, ParkingService};
use crate::error::{ApiResult, ServiceError};
use parking_core::validation::{validate_id, validate_new_lot};
use parking_core::{CoreError, NewParkingLot, ParkingLot};
use parking_db::Store;

fn default_opened() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotRequest {
    pub address: String,
    #[serde(default = "default_opened")]
    pub opened: bool,
    pub total_places: i64,
    /// Defaults to `total_places`.
    #[serde(default)]
    pub available_places: Option<i64>,
}

impl From<CreateLotRequest> for NewParkingLot {
    fn from(req: CreateLotRequest) -> Self {
        NewParkingLot {
            address: req.address,
            opened: req.opened,
            total_places: req.total_places,
            available_places: req.available_places.unwrap_or(req.total_places),
        }
    }
}

impl<S: Store> ParkingService<S> {
    /// Registers a lot.
    ///
    /// A lot created without available places is stored closed.
    pub async fn create_lot(&self, req: CreateLotRequest) -> ApiResult<ParkingLot> {
        debug!("create_lot command");

        let lot = validate_new_lot(req.into()).map_err(|e| reject("create_lot", e.into()))?;

        let created = self
            .store()
            .insert_lot(&lot)
            .await
            .map_err(|e| reject("create_lot", e.into()))?;

        info!(
            lot_id = created.id,
            total_places = created.total_places,
            opened = created.opened,
            "Lot registered"
        );
        Ok(created)
    }

    /// Gets a lot by id.
    pub async fn get_lot(&self, id: i64) -> ApiResult<ParkingLot> {
        debug!(id, "get_lot command");

        let lot = async {
            validate_id("lot_id", id)?;
            self.store()
                .get_lot(id)
                .await?
                .ok_or_else(|| ServiceError::from(CoreError::LotNotFound(id)))
        }
        .await
        .map_err(|e| reject("get_lot", e))?;

        Ok(lot)
    }

    /// Lists all lots.
    pub async fn list_lots(&self) -> ApiResult<Vec<ParkingLot>> {
        debug!("list_lots command");
        self.store()
            .list_lots()
            .await
            .map_err(|e| reject("list_lots", e.into()))
    }
}
