//! Marketplace participants: buyers (with purchase preferences) and sellers.

pub mod buyer;
pub mod email;
pub mod preferences;
pub mod seller;

pub use buyer::{Buyer, BuyerRegistration};
pub use email::normalize_email;
pub use preferences::{CarProfile, Preferences};
pub use seller::{Seller, SellerRegistration};
