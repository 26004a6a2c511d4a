use dealership_auth::{Principal, require_seller};
use dealership_catalog::{NewStore, Store};
use dealership_core::StoreId;

use crate::error::ServiceResult;

use super::Marketplace;

impl Marketplace {
    pub async fn create_store(&self, principal: &Principal, new: NewStore) -> ServiceResult<Store> {
        require_seller(principal)?;
        let store = Store::open(StoreId::new(), new, self.clock.now())?;
        self.store.insert_store(&store).await?;
        Ok(store)
    }

    pub async fn stores(&self) -> ServiceResult<Vec<(Store, i64)>> {
        Ok(self.store.stores_with_car_counts().await?)
    }
}
