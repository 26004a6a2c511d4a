use chrono::{DateTime, Utc};
use serde::Deserialize;

use dealership_core::{BuyerId, DomainError, DomainResult, Entity};

use crate::{Preferences, normalize_email};

/// A registered buyer. `password_hash` never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buyer {
    pub id: BuyerId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub contact_info: Option<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

impl Entity for Buyer {
    type Id = BuyerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Self-service buyer sign-up input (password still in clear).
#[derive(Debug, Clone, Deserialize)]
pub struct BuyerRegistration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(flatten)]
    pub preferences: Preferences,
}

impl BuyerRegistration {
    /// Validate, then build the record around an already computed digest.
    pub fn into_buyer(
        self,
        id: BuyerId,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Buyer> {
        let email = normalize_email(&self.email)?;
        validate_profile(&self.password, &self.full_name)?;
        let preferences = self.preferences.normalized();
        preferences.validate()?;

        Ok(Buyer {
            id,
            email,
            password_hash,
            full_name: self.full_name.trim().to_string(),
            contact_info: self.contact_info,
            preferences,
            created_at: now,
        })
    }
}

pub(crate) fn validate_profile(password: &str, full_name: &str) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::validation("password must not be empty"));
    }
    if full_name.trim().is_empty() {
        return Err(DomainError::validation("full_name must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> BuyerRegistration {
        BuyerRegistration {
            email: " B@x.com".to_string(),
            password: "pw1".to_string(),
            full_name: "Bea Buyer".to_string(),
            contact_info: Some("555-0100".to_string()),
            preferences: Preferences::default(),
        }
    }

    #[test]
    fn registration_normalizes_email() {
        let b = registration()
            .into_buyer(BuyerId::new(), "digest".to_string(), Utc::now())
            .unwrap();
        assert_eq!(b.email, "b@x.com");
        assert_eq!(b.password_hash, "digest");
    }

    #[test]
    fn registration_rejects_empty_password() {
        let mut r = registration();
        r.password.clear();
        let err = r
            .into_buyer(BuyerId::new(), "digest".to_string(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn preferences_deserialize_flattened() {
        let r: BuyerRegistration = serde_json::from_value(serde_json::json!({
            "email": "b@x.com",
            "password": "pw1",
            "full_name": "Bea",
            "preferred_brand": "Toyota",
            "preferred_transmission": "automatic",
            "max_price": 25000
        }))
        .unwrap();
        assert_eq!(r.preferences.preferred_brand.as_deref(), Some("Toyota"));
        assert_eq!(r.preferences.max_price, Some(25_000));
    }
}
