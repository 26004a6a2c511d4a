use tracing::instrument;

use dealership_auth::{Principal, require_buyer, require_seller};
use dealership_core::{CarId, DealId};
use dealership_sales::Deal;

use crate::error::{ServiceError, ServiceResult};
use crate::store::DealListing;

use super::Marketplace;

impl Marketplace {
    /// Opens a pending deal at the car's current price.
    #[instrument(skip(self, principal), err)]
    pub async fn create_deal(&self, principal: &Principal, car_id: CarId) -> ServiceResult<Deal> {
        let buyer = require_buyer(principal)?;
        let car = self.car(car_id).await?;

        let deal = Deal::open(DealId::new(), buyer.id, &car, self.clock.now());
        self.store.insert_deal(&deal).await?;

        tracing::info!(deal_id = %deal.id, buyer_id = %buyer.id, car_id = %car.id, price = deal.price, "deal created");
        Ok(deal)
    }

    /// Buyers see their own deals; sellers see deals on their cars.
    pub async fn my_deals(&self, principal: &Principal) -> ServiceResult<Vec<DealListing>> {
        let listings = match principal {
            Principal::Buyer(b) => self.store.deals_for_buyer(b.id).await?,
            Principal::Seller(s) => self.store.deals_for_seller(s.id).await?,
        };
        Ok(listings)
    }

    /// Fails `NotFound`, then `Forbidden` for a non-owner, then
    /// `InvalidValue` for an unknown label, then `InvalidTransition` when the
    /// configured policy refuses the move.
    #[instrument(skip(self, principal), err)]
    pub async fn set_deal_status(
        &self,
        principal: &Principal,
        deal_id: DealId,
        requested: &str,
    ) -> ServiceResult<Deal> {
        let seller = require_seller(principal)?;
        let mut deal = self
            .store
            .deal(deal_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("deal"))?;
        let car = self.car(deal.car_id).await?;

        let next = deal.decide_status(car.seller_id, seller.id, requested, self.policy)?;
        self.store
            .update_deal_status(deal.id, deal.status, next)
            .await?;

        tracing::info!(deal_id = %deal.id, from = %deal.status, to = %next, "deal status changed");
        deal.apply_status(next);
        Ok(deal)
    }
}
