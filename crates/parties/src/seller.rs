use chrono::{DateTime, Utc};
use serde::Deserialize;

use dealership_core::{DomainResult, Entity, SellerId};

use crate::buyer::validate_profile;
use crate::normalize_email;

/// A registered seller. Admins are sellers whose tokens carry the `admin`
/// claim; nothing about them is stored differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seller {
    pub id: SellerId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub contact_info: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Seller {
    type Id = SellerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerRegistration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub contact_info: Option<String>,
}

impl SellerRegistration {
    pub fn into_seller(
        self,
        id: SellerId,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Seller> {
        let email = normalize_email(&self.email)?;
        validate_profile(&self.password, &self.full_name)?;
        Ok(Seller {
            id,
            email,
            password_hash,
            full_name: self.full_name.trim().to_string(),
            contact_info: self.contact_info,
            created_at: now,
        })
    }
}
