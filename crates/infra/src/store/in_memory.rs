//! Single-process store for tests and local runs.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use dealership_catalog::{Car, CarFilter, Favorite, Store};
use dealership_core::{
    BuyerId, CarId, DealId, QuestionId, SellerId, StoreId, find_by_id, find_by_id_mut,
};
use dealership_parties::{Buyer, Seller};
use dealership_sales::{Deal, DealStatus, Question};

use super::{
    AccountStore, CarStore, CarSummary, DealListing, DealStore, FavoriteStore, QuestionStore,
    StoreDirectory, StoreError,
};

#[derive(Debug, Default)]
struct Tables {
    buyers: HashMap<BuyerId, Buyer>,
    sellers: HashMap<SellerId, Seller>,
    stores: Vec<Store>,
    // Vecs keep insertion order, which is what listings return.
    cars: Vec<Car>,
    deals: Vec<Deal>,
    questions: Vec<Question>,
    favorites: Vec<Favorite>,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        self.buyers.values().any(|b| b.email == email)
            || self.sellers.values().any(|s| s.email == email)
    }

    fn car(&self, id: CarId) -> Option<&Car> {
        find_by_id(&self.cars, &id)
    }

    fn require_car(&self, id: CarId) -> Result<&Car, StoreError> {
        self.car(id).ok_or_else(|| StoreError::NotFound("car".to_string()))
    }

    fn listing(&self, deal: &Deal) -> Option<DealListing> {
        let car = self.car(deal.car_id)?;
        let seller = self.sellers.get(&car.seller_id)?;
        let buyer = self.buyers.get(&deal.buyer_id)?;
        Some(DealListing {
            deal: deal.clone(),
            car: CarSummary {
                id: car.id,
                brand: car.spec.brand.clone(),
                model: car.spec.model.clone(),
                year: car.spec.year,
            },
            seller_name: seller.full_name.clone(),
            buyer_name: buyer.full_name.clone(),
            buyer_contact: buyer.contact_info.clone(),
        })
    }
}

/// All tables behind one lock: each write method holds the write guard for
/// its whole check-then-insert.
#[derive(Debug, Default)]
pub struct InMemoryMarketplace {
    tables: RwLock<Tables>,
}

impl InMemoryMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for InMemoryMarketplace {
    async fn insert_buyer(&self, buyer: &Buyer) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.email_taken(&buyer.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        t.buyers.insert(buyer.id, buyer.clone());
        Ok(())
    }

    async fn insert_seller(&self, seller: &Seller) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.email_taken(&seller.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        t.sellers.insert(seller.id, seller.clone());
        Ok(())
    }

    async fn buyer_by_email(&self, email: &str) -> Result<Option<Buyer>, StoreError> {
        Ok(self.read()?.buyers.values().find(|b| b.email == email).cloned())
    }

    async fn seller_by_email(&self, email: &str) -> Result<Option<Seller>, StoreError> {
        Ok(self.read()?.sellers.values().find(|s| s.email == email).cloned())
    }

    async fn buyer(&self, id: BuyerId) -> Result<Option<Buyer>, StoreError> {
        Ok(self.read()?.buyers.get(&id).cloned())
    }

    async fn seller(&self, id: SellerId) -> Result<Option<Seller>, StoreError> {
        Ok(self.read()?.sellers.get(&id).cloned())
    }

    async fn list_buyers(&self) -> Result<Vec<Buyer>, StoreError> {
        let mut buyers: Vec<Buyer> = self.read()?.buyers.values().cloned().collect();
        buyers.sort_by_key(|b| b.id);
        Ok(buyers)
    }
}

#[async_trait]
impl StoreDirectory for InMemoryMarketplace {
    async fn insert_store(&self, store: &Store) -> Result<(), StoreError> {
        self.write()?.stores.push(store.clone());
        Ok(())
    }

    async fn store(&self, id: StoreId) -> Result<Option<Store>, StoreError> {
        Ok(find_by_id(&self.read()?.stores, &id).cloned())
    }

    async fn stores_with_car_counts(&self) -> Result<Vec<(Store, i64)>, StoreError> {
        let t = self.read()?;
        Ok(t.stores
            .iter()
            .map(|s| {
                let count = t.cars.iter().filter(|c| c.store_id == Some(s.id)).count();
                (s.clone(), count as i64)
            })
            .collect())
    }
}

#[async_trait]
impl CarStore for InMemoryMarketplace {
    async fn insert_car(&self, car: &Car) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if let Some(store_id) = car.store_id {
            if find_by_id(&t.stores, &store_id).is_none() {
                return Err(StoreError::NotFound("store".to_string()));
            }
        }
        t.cars.push(car.clone());
        Ok(())
    }

    async fn car(&self, id: CarId) -> Result<Option<Car>, StoreError> {
        Ok(self.read()?.car(id).cloned())
    }

    async fn search_cars(&self, filter: &CarFilter) -> Result<Vec<Car>, StoreError> {
        Ok(filter.apply(&self.read()?.cars))
    }

    async fn cars_by_seller(&self, seller_id: SellerId) -> Result<Vec<Car>, StoreError> {
        Ok(self
            .read()?
            .cars
            .iter()
            .filter(|c| c.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn count_cars_by_seller(&self, seller_id: SellerId) -> Result<i64, StoreError> {
        Ok(self.read()?.cars.iter().filter(|c| c.seller_id == seller_id).count() as i64)
    }

    async fn car_prices(&self) -> Result<Vec<i64>, StoreError> {
        Ok(self.read()?.cars.iter().map(Car::price).collect())
    }

    async fn most_expensive_car(&self) -> Result<Option<Car>, StoreError> {
        let t = self.read()?;
        // Earliest listing wins a price tie.
        let top = t
            .cars
            .iter()
            .fold(None::<&Car>, |best, c| match best {
                Some(b) if b.spec.price >= c.spec.price => Some(b),
                _ => Some(c),
            });
        Ok(top.cloned())
    }

    async fn update_car(&self, car: &Car) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if let Some(store_id) = car.store_id {
            if find_by_id(&t.stores, &store_id).is_none() {
                return Err(StoreError::NotFound("store".to_string()));
            }
        }
        let slot = find_by_id_mut(&mut t.cars, &car.id)
            .ok_or_else(|| StoreError::NotFound("car".to_string()))?;
        slot.spec = car.spec.clone();
        slot.store_id = car.store_id;
        slot.status = car.status;
        Ok(())
    }

    async fn delete_car(&self, id: CarId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let car = t.require_car(id)?;
        let active = t
            .deals
            .iter()
            .filter(|d| d.car_id == id && d.status.is_active())
            .count();
        car.ensure_deletable(active)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        t.cars.retain(|c| c.id != id);
        t.deals.retain(|d| d.car_id != id);
        t.questions.retain(|q| q.car_id != id);
        t.favorites.retain(|f| f.car_id != id);
        Ok(())
    }
}

#[async_trait]
impl DealStore for InMemoryMarketplace {
    async fn insert_deal(&self, deal: &Deal) -> Result<(), StoreError> {
        let mut t = self.write()?;
        t.require_car(deal.car_id)?;
        let duplicate = t.deals.iter().any(|d| {
            d.buyer_id == deal.buyer_id && d.car_id == deal.car_id && d.status.blocks_new_deal()
        });
        if duplicate {
            return Err(StoreError::Conflict(
                "a pending deal for this car already exists".to_string(),
            ));
        }
        t.deals.push(deal.clone());
        Ok(())
    }

    async fn deal(&self, id: DealId) -> Result<Option<Deal>, StoreError> {
        Ok(find_by_id(&self.read()?.deals, &id).cloned())
    }

    async fn deals_for_buyer(&self, buyer_id: BuyerId) -> Result<Vec<DealListing>, StoreError> {
        let t = self.read()?;
        Ok(t.deals
            .iter()
            .filter(|d| d.buyer_id == buyer_id)
            .filter_map(|d| t.listing(d))
            .collect())
    }

    async fn deals_for_seller(&self, seller_id: SellerId) -> Result<Vec<DealListing>, StoreError> {
        let t = self.read()?;
        Ok(t.deals
            .iter()
            .filter(|d| t.car(d.car_id).is_some_and(|c| c.seller_id == seller_id))
            .filter_map(|d| t.listing(d))
            .collect())
    }

    async fn update_deal_status(
        &self,
        id: DealId,
        expected: DealStatus,
        next: DealStatus,
    ) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let (buyer_id, car_id) = find_by_id(&t.deals, &id)
            .map(|d| (d.buyer_id, d.car_id))
            .ok_or_else(|| StoreError::NotFound("deal".to_string()))?;
        if next.blocks_new_deal()
            && t.deals.iter().any(|d| {
                d.id != id && d.buyer_id == buyer_id && d.car_id == car_id && d.status.blocks_new_deal()
            })
        {
            return Err(StoreError::Conflict(
                "a pending deal for this car already exists".to_string(),
            ));
        }
        let deal = find_by_id_mut(&mut t.deals, &id)
            .ok_or_else(|| StoreError::NotFound("deal".to_string()))?;
        if deal.status != expected {
            return Err(StoreError::Conflict(format!(
                "deal status changed concurrently (now '{}')",
                deal.status
            )));
        }
        deal.apply_status(next);
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for InMemoryMarketplace {
    async fn insert_question(&self, question: &Question) -> Result<(), StoreError> {
        let mut t = self.write()?;
        t.require_car(question.car_id)?;
        t.questions.push(question.clone());
        Ok(())
    }

    async fn question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        Ok(find_by_id(&self.read()?.questions, &id).cloned())
    }

    async fn questions_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Question>, StoreError> {
        Ok(self
            .read()?
            .questions
            .iter()
            .filter(|q| q.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn questions_for_seller(&self, seller_id: SellerId) -> Result<Vec<Question>, StoreError> {
        let t = self.read()?;
        Ok(t.questions
            .iter()
            .filter(|q| t.car(q.car_id).is_some_and(|c| c.seller_id == seller_id))
            .cloned()
            .collect())
    }

    async fn set_answer(&self, id: QuestionId, answer: &str) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let question = find_by_id_mut(&mut t.questions, &id)
            .ok_or_else(|| StoreError::NotFound("question".to_string()))?;
        question.apply_answer(answer.to_string());
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for InMemoryMarketplace {
    async fn insert_favorite(&self, favorite: &Favorite) -> Result<(), StoreError> {
        let mut t = self.write()?;
        t.require_car(favorite.car_id)?;
        if t.favorites
            .iter()
            .any(|f| f.is_for(favorite.buyer_id, favorite.car_id))
        {
            return Err(StoreError::Conflict("car is already a favorite".to_string()));
        }
        t.favorites.push(favorite.clone());
        Ok(())
    }

    async fn remove_favorite(&self, buyer_id: BuyerId, car_id: CarId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let before = t.favorites.len();
        t.favorites.retain(|f| !f.is_for(buyer_id, car_id));
        if t.favorites.len() == before {
            return Err(StoreError::NotFound("favorite".to_string()));
        }
        Ok(())
    }

    async fn favorites_of(&self, buyer_id: BuyerId) -> Result<Vec<(Favorite, Car)>, StoreError> {
        let t = self.read()?;
        let mut rows: Vec<(Favorite, Car)> = t
            .favorites
            .iter()
            .filter(|f| f.buyer_id == buyer_id)
            .filter_map(|f| t.car(f.car_id).map(|c| (f.clone(), c.clone())))
            .collect();
        rows.sort_by(|a, b| b.0.added_at.cmp(&a.0.added_at));
        Ok(rows)
    }
}
