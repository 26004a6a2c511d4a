//! Persistence seams.
//!
//! Every mutating method is one atomic unit: uniqueness rules are enforced
//! by the store itself (a single write guard in memory, constraints and
//! transactions in Postgres), never by a separate read beforehand.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use dealership_catalog::{Car, CarFilter, Favorite, Store};
use dealership_core::{BuyerId, CarId, DealId, QuestionId, SellerId, StoreId};
use dealership_parties::{Buyer, Seller};
use dealership_sales::{Deal, DealStatus, Question};

pub use in_memory::InMemoryMarketplace;
pub use postgres::PostgresMarketplace;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The row to update, or a row the write references, does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Car fields shown alongside a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarSummary {
    pub id: CarId,
    pub brand: String,
    pub model: String,
    pub year: i32,
}

/// A deal joined with its car and both parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealListing {
    pub deal: Deal,
    pub car: CarSummary,
    pub seller_name: String,
    pub buyer_name: String,
    pub buyer_contact: Option<String>,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// `Conflict` when the email is registered as a buyer or a seller.
    async fn insert_buyer(&self, buyer: &Buyer) -> Result<(), StoreError>;

    /// `Conflict` when the email is registered as a buyer or a seller.
    async fn insert_seller(&self, seller: &Seller) -> Result<(), StoreError>;

    async fn buyer_by_email(&self, email: &str) -> Result<Option<Buyer>, StoreError>;
    async fn seller_by_email(&self, email: &str) -> Result<Option<Seller>, StoreError>;
    async fn buyer(&self, id: BuyerId) -> Result<Option<Buyer>, StoreError>;
    async fn seller(&self, id: SellerId) -> Result<Option<Seller>, StoreError>;
    async fn list_buyers(&self) -> Result<Vec<Buyer>, StoreError>;
}

#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn insert_store(&self, store: &Store) -> Result<(), StoreError>;
    async fn store(&self, id: StoreId) -> Result<Option<Store>, StoreError>;

    /// Every store with the number of cars placed at it.
    async fn stores_with_car_counts(&self) -> Result<Vec<(Store, i64)>, StoreError>;
}

#[async_trait]
pub trait CarStore: Send + Sync {
    /// `NotFound` when `store_id` names a missing store.
    async fn insert_car(&self, car: &Car) -> Result<(), StoreError>;
    async fn car(&self, id: CarId) -> Result<Option<Car>, StoreError>;
    async fn search_cars(&self, filter: &CarFilter) -> Result<Vec<Car>, StoreError>;
    async fn cars_by_seller(&self, seller_id: SellerId) -> Result<Vec<Car>, StoreError>;
    async fn count_cars_by_seller(&self, seller_id: SellerId) -> Result<i64, StoreError>;
    async fn car_prices(&self) -> Result<Vec<i64>, StoreError>;
    /// Highest price; the earliest listing wins a tie.
    async fn most_expensive_car(&self) -> Result<Option<Car>, StoreError>;

    /// Overwrites spec, store and status. `NotFound` when the car is gone.
    async fn update_car(&self, car: &Car) -> Result<(), StoreError>;

    /// Removes the car with its favorites, questions and closed deals.
    /// `Conflict` while a pending or approved deal exists.
    async fn delete_car(&self, id: CarId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait DealStore: Send + Sync {
    /// `Conflict` when the buyer already has a pending deal on the car,
    /// `NotFound` when the car is gone.
    async fn insert_deal(&self, deal: &Deal) -> Result<(), StoreError>;
    async fn deal(&self, id: DealId) -> Result<Option<Deal>, StoreError>;
    async fn deals_for_buyer(&self, buyer_id: BuyerId) -> Result<Vec<DealListing>, StoreError>;
    async fn deals_for_seller(&self, seller_id: SellerId) -> Result<Vec<DealListing>, StoreError>;

    /// Compare-and-set: `Conflict` when the status is no longer `expected`.
    async fn update_deal_status(
        &self,
        id: DealId,
        expected: DealStatus,
        next: DealStatus,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// `NotFound` when the car is gone.
    async fn insert_question(&self, question: &Question) -> Result<(), StoreError>;
    async fn question(&self, id: QuestionId) -> Result<Option<Question>, StoreError>;
    async fn questions_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Question>, StoreError>;
    async fn questions_for_seller(&self, seller_id: SellerId) -> Result<Vec<Question>, StoreError>;
    async fn set_answer(&self, id: QuestionId, answer: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// `Conflict` on a second favorite for the same pair, `NotFound` when
    /// the car is gone.
    async fn insert_favorite(&self, favorite: &Favorite) -> Result<(), StoreError>;

    /// `NotFound` when the pair is not favorited.
    async fn remove_favorite(&self, buyer_id: BuyerId, car_id: CarId) -> Result<(), StoreError>;

    /// Newest first.
    async fn favorites_of(&self, buyer_id: BuyerId) -> Result<Vec<(Favorite, Car)>, StoreError>;
}

/// Everything the workflows need from one backend.
pub trait MarketplaceStore:
    AccountStore + StoreDirectory + CarStore + DealStore + QuestionStore + FavoriteStore
{
}

impl<T> MarketplaceStore for T where
    T: AccountStore + StoreDirectory + CarStore + DealStore + QuestionStore + FavoriteStore
{
}
