use serde::Serialize;

use dealership_core::{BuyerId, SellerId};

use crate::Role;

/// Authenticated buyer, as loaded from the buyers table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyerIdentity {
    pub id: BuyerId,
    pub email: String,
    pub full_name: String,
}

/// Authenticated seller or admin, as loaded from the sellers table.
///
/// `role` is the token's claim (`Seller` or `Admin`); both carry the same
/// capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerIdentity {
    pub id: SellerId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// A resolved request principal.
///
/// The variant is fixed once at authentication time and every capability
/// check downstream matches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Buyer(BuyerIdentity),
    Seller(SellerIdentity),
}

impl Principal {
    pub fn email(&self) -> &str {
        match self {
            Principal::Buyer(b) => &b.email,
            Principal::Seller(s) => &s.email,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Buyer(_) => Role::Buyer,
            Principal::Seller(s) => s.role,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            Principal::Buyer(b) => &b.full_name,
            Principal::Seller(s) => &s.full_name,
        }
    }
}
