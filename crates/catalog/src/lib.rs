//! Vehicle catalog domain module.
//!
//! Car listings, physical stores and buyer favorites, as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod car;
pub mod favorite;
pub mod filter;
pub mod store;

pub use car::{Car, CarSpec, CarStatus, Condition, NewCar, Transmission};
pub use favorite::Favorite;
pub use filter::CarFilter;
pub use store::{NewStore, Store};
