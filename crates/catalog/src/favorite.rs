use chrono::{DateTime, Utc};

use dealership_core::{BuyerId, CarId, Entity, FavoriteId};

/// A buyer's bookmark on a car. At most one per (buyer, car) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: FavoriteId,
    pub buyer_id: BuyerId,
    pub car_id: CarId,
    pub added_at: DateTime<Utc>,
}

impl Entity for Favorite {
    type Id = FavoriteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Favorite {
    pub fn new(buyer_id: BuyerId, car_id: CarId, now: DateTime<Utc>) -> Self {
        Self {
            id: FavoriteId::new(),
            buyer_id,
            car_id,
            added_at: now,
        }
    }

    pub fn is_for(&self, buyer_id: BuyerId, car_id: CarId) -> bool {
        self.buyer_id == buyer_id && self.car_id == car_id
    }
}
