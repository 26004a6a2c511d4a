use core::str::FromStr;

use serde::{Deserialize, Serialize};

use dealership_core::DomainError;

/// Role carried in a token's `role` claim.
///
/// `Admin` is a seller-shaped principal: it is stored in the sellers table and
/// passes every seller gate. Nothing in this system is admin-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    /// Whether principals with this role are looked up in the sellers table.
    pub fn is_seller_scoped(&self) -> bool {
        matches!(self, Role::Seller | Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::invalid_value(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert!("Buyer".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn admin_is_seller_scoped() {
        assert!(Role::Admin.is_seller_scoped());
        assert!(Role::Seller.is_seller_scoped());
        assert!(!Role::Buyer.is_seller_scoped());
    }
}
