use tracing::instrument;

use dealership_auth::{Principal, require_buyer};
use dealership_catalog::{Car, Favorite};
use dealership_core::CarId;

use crate::error::ServiceResult;

use super::Marketplace;

impl Marketplace {
    #[instrument(skip(self, principal), err)]
    pub async fn add_favorite(&self, principal: &Principal, car_id: CarId) -> ServiceResult<Favorite> {
        let buyer = require_buyer(principal)?;
        let car = self.car(car_id).await?;

        let favorite = Favorite::new(buyer.id, car.id, self.clock.now());
        self.store.insert_favorite(&favorite).await?;
        Ok(favorite)
    }

    #[instrument(skip(self, principal), err)]
    pub async fn remove_favorite(&self, principal: &Principal, car_id: CarId) -> ServiceResult<()> {
        let buyer = require_buyer(principal)?;
        self.store.remove_favorite(buyer.id, car_id).await?;
        Ok(())
    }

    pub async fn favorites(&self, principal: &Principal) -> ServiceResult<Vec<(Favorite, Car)>> {
        let buyer = require_buyer(principal)?;
        Ok(self.store.favorites_of(buyer.id).await?)
    }
}
