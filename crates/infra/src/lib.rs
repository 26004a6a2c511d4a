//! Infrastructure layer: configuration, persistence and the request workflows
//! that tie the domain crates to a store.

pub mod config;
pub mod directory;
pub mod error;
pub mod store;
pub mod workflows;

mod integration_tests;

pub use config::AppConfig;
pub use directory::AccountDirectory;
pub use error::{ServiceError, ServiceResult};
pub use store::{
    AccountStore, CarStore, CarSummary, DealListing, DealStore, FavoriteStore, InMemoryMarketplace,
    MarketplaceStore, PostgresMarketplace, QuestionStore, StoreDirectory, StoreError,
};
pub use workflows::{
    CarDetails, LOW_MILEAGE_CEILING, ListedCar, LoginOutcome, MarketAnalysis, Marketplace,
    Profile,
};
