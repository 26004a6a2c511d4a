use tracing::instrument;

use dealership_auth::{Principal, require_seller};
use dealership_catalog::{Car, CarFilter, CarSpec, CarStatus, NewCar};
use dealership_catalog::Store;
use dealership_core::{CarId, StoreId};
use dealership_parties::Seller;

use crate::error::{ServiceError, ServiceResult};

use super::Marketplace;

/// A car with the seller and store it is listed under.
#[derive(Debug, Clone)]
pub struct CarDetails {
    pub car: Car,
    pub seller: Option<Seller>,
    pub store: Option<Store>,
}

impl Marketplace {
    pub async fn search_cars(&self, filter: &CarFilter) -> ServiceResult<Vec<Car>> {
        Ok(self.store.search_cars(filter).await?)
    }

    pub async fn car(&self, id: CarId) -> ServiceResult<Car> {
        self.store
            .car(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car"))
    }

    pub async fn car_details(&self, id: CarId) -> ServiceResult<CarDetails> {
        let car = self.car(id).await?;
        let seller = self.store.seller(car.seller_id).await?;
        let store = match car.store_id {
            Some(store_id) => self.store.store(store_id).await?,
            None => None,
        };
        Ok(CarDetails { car, seller, store })
    }

    pub async fn my_cars(&self, principal: &Principal) -> ServiceResult<Vec<Car>> {
        let seller = require_seller(principal)?;
        Ok(self.store.cars_by_seller(seller.id).await?)
    }

    #[instrument(skip(self, principal, spec), err)]
    pub async fn create_car(
        &self,
        principal: &Principal,
        store_id: Option<StoreId>,
        spec: CarSpec,
    ) -> ServiceResult<Car> {
        let seller = require_seller(principal)?;
        self.ensure_store_exists(store_id).await?;

        let car = Car::list(
            CarId::new(),
            NewCar {
                seller_id: seller.id,
                store_id,
                spec,
            },
            self.clock.now(),
        )?;
        self.store.insert_car(&car).await?;

        tracing::info!(car_id = %car.id, seller_id = %seller.id, "car listed");
        Ok(car)
    }

    #[instrument(skip(self, principal, spec), err)]
    pub async fn update_car(
        &self,
        principal: &Principal,
        id: CarId,
        store_id: Option<StoreId>,
        spec: CarSpec,
    ) -> ServiceResult<Car> {
        let seller = require_seller(principal)?;
        let mut car = self.car(id).await?;
        car.ensure_owned_by(seller.id)?;
        spec.validate()?;
        self.ensure_store_exists(store_id).await?;

        car.spec = spec;
        car.store_id = store_id;
        self.store.update_car(&car).await?;
        Ok(car)
    }

    #[instrument(skip(self, principal), err)]
    pub async fn set_car_status(
        &self,
        principal: &Principal,
        id: CarId,
        requested: &str,
    ) -> ServiceResult<Car> {
        let seller = require_seller(principal)?;
        let mut car = self.car(id).await?;
        car.ensure_owned_by(seller.id)?;

        car.status = requested.parse::<CarStatus>()?;
        self.store.update_car(&car).await?;
        Ok(car)
    }

    /// Refused while the car has a pending or approved deal.
    #[instrument(skip(self, principal), err)]
    pub async fn delete_car(&self, principal: &Principal, id: CarId) -> ServiceResult<()> {
        let seller = require_seller(principal)?;
        let car = self.car(id).await?;
        car.ensure_owned_by(seller.id)?;

        self.store.delete_car(id).await?;
        tracing::info!(car_id = %id, seller_id = %seller.id, "car deleted");
        Ok(())
    }

    async fn ensure_store_exists(&self, store_id: Option<StoreId>) -> ServiceResult<()> {
        if let Some(id) = store_id {
            if self.store.store(id).await?.is_none() {
                return Err(ServiceError::not_found("store"));
            }
        }
        Ok(())
    }
}
