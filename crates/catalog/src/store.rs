use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealership_core::{DomainError, DomainResult, Entity, StoreId};

/// Physical dealership location a car may be listed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStore {
    pub name: String,
    pub address: String,
}

impl NewStore {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("store name must not be empty"));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::validation("store address must not be empty"));
        }
        Ok(())
    }
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Store {
    pub fn open(id: StoreId, new: NewStore, now: DateTime<Utc>) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self {
            id,
            name: new.name.trim().to_string(),
            address: new.address.trim().to_string(),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let err = Store::open(
            StoreId::new(),
            NewStore {
                name: "  ".to_string(),
                address: "1 Main St".to_string(),
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn fields_are_trimmed() {
        let s = Store::open(
            StoreId::new(),
            NewStore {
                name: " Downtown ".to_string(),
                address: "1 Main St ".to_string(),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(s.name, "Downtown");
        assert_eq!(s.address, "1 Main St");
    }
}
