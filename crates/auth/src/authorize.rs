//! Capability gates over a resolved [`Principal`].
//!
//! - No IO
//! - No panics
//! - Decided by the principal's variant only, never by re-reading a token

use thiserror::Error;

use dealership_core::DomainError;

use crate::{BuyerIdentity, Principal, SellerIdentity};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: buyers only")]
    BuyersOnly,

    #[error("forbidden: sellers and admins only")]
    SellersOnly,
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::forbidden(value.to_string())
    }
}

/// Succeeds only for a buyer principal.
pub fn require_buyer(principal: &Principal) -> Result<&BuyerIdentity, AuthzError> {
    match principal {
        Principal::Buyer(b) => Ok(b),
        Principal::Seller(_) => Err(AuthzError::BuyersOnly),
    }
}

/// Succeeds for a seller principal, whether its role claim was `seller` or `admin`.
pub fn require_seller(principal: &Principal) -> Result<&SellerIdentity, AuthzError> {
    match principal {
        Principal::Seller(s) => Ok(s),
        Principal::Buyer(_) => Err(AuthzError::SellersOnly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use dealership_core::{BuyerId, SellerId};

    fn buyer() -> Principal {
        Principal::Buyer(BuyerIdentity {
            id: BuyerId::new(),
            email: "b@x.com".to_string(),
            full_name: "Bea Buyer".to_string(),
        })
    }

    fn seller(role: Role) -> Principal {
        Principal::Seller(SellerIdentity {
            id: SellerId::new(),
            email: "s@x.com".to_string(),
            full_name: "Sam Seller".to_string(),
            role,
        })
    }

    #[test]
    fn buyer_passes_buyer_gate_only() {
        let p = buyer();
        assert!(require_buyer(&p).is_ok());
        assert_eq!(require_seller(&p).unwrap_err(), AuthzError::SellersOnly);
    }

    #[test]
    fn seller_and_admin_pass_seller_gate_only() {
        for role in [Role::Seller, Role::Admin] {
            let p = seller(role);
            assert!(require_seller(&p).is_ok());
            assert_eq!(require_buyer(&p).unwrap_err(), AuthzError::BuyersOnly);
        }
    }

    #[test]
    fn gate_failure_is_forbidden_in_domain_terms() {
        let err: DomainError = require_seller(&buyer()).unwrap_err().into();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
