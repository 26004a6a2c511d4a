use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealership_core::{CarId, DomainError, DomainResult, Entity, SellerId, StoreId, ValueObject};

/// Gearbox type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "automatic",
            Transmission::Manual => "manual",
        }
    }
}

impl FromStr for Transmission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Transmission::Automatic),
            "manual" => Ok(Transmission::Manual),
            other => Err(DomainError::invalid_value(format!(
                "transmission must be one of: automatic, manual (got '{other}')"
            ))),
        }
    }
}

/// New or pre-owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            other => Err(DomainError::invalid_value(format!(
                "condition must be one of: new, used (got '{other}')"
            ))),
        }
    }
}

/// Listing visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    #[default]
    Active,
    Inactive,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Active => "active",
            CarStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for CarStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CarStatus::Active),
            "inactive" => Ok(CarStatus::Inactive),
            other => Err(DomainError::invalid_value(format!(
                "car status must be one of: active, inactive (got '{other}')"
            ))),
        }
    }
}

/// Seller-editable description of a car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSpec {
    pub brand: String,
    pub model: String,
    pub year: i32,
    /// Engine power, horsepower.
    pub power: i32,
    pub transmission: Transmission,
    pub condition: Condition,
    /// Odometer reading, kilometres.
    pub mileage: i32,
    /// Asking price in whole currency units.
    pub price: i64,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ValueObject for CarSpec {}

impl CarSpec {
    pub fn validate(&self) -> DomainResult<()> {
        if self.brand.trim().is_empty() {
            return Err(DomainError::validation("brand must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(DomainError::validation("model must not be empty"));
        }
        if !(1886..=2100).contains(&self.year) {
            return Err(DomainError::validation("year is out of range"));
        }
        if self.power <= 0 {
            return Err(DomainError::validation("power must be positive"));
        }
        if self.mileage < 0 {
            return Err(DomainError::validation("mileage must not be negative"));
        }
        if self.price <= 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        Ok(())
    }
}

/// Input for a new listing. The owner comes from the authenticated seller,
/// never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    pub seller_id: SellerId,
    pub store_id: Option<StoreId>,
    pub spec: CarSpec,
}

/// A car listing, owned by exactly one seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub id: CarId,
    pub seller_id: SellerId,
    pub store_id: Option<StoreId>,
    pub spec: CarSpec,
    pub status: CarStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for Car {
    type Id = CarId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Car {
    /// Build a listing from validated input.
    pub fn list(id: CarId, new: NewCar, now: DateTime<Utc>) -> DomainResult<Self> {
        new.spec.validate()?;
        Ok(Self {
            id,
            seller_id: new.seller_id,
            store_id: new.store_id,
            spec: new.spec,
            status: CarStatus::Active,
            created_at: now,
        })
    }

    pub fn is_owned_by(&self, seller_id: SellerId) -> bool {
        self.seller_id == seller_id
    }

    pub fn ensure_owned_by(&self, seller_id: SellerId) -> DomainResult<()> {
        if !self.is_owned_by(seller_id) {
            return Err(DomainError::forbidden("car belongs to another seller"));
        }
        Ok(())
    }

    /// A car with pending or approved deals cannot be removed.
    pub fn ensure_deletable(&self, active_deals: usize) -> DomainResult<()> {
        if active_deals > 0 {
            return Err(DomainError::conflict(format!(
                "car has {active_deals} active deal(s)"
            )));
        }
        Ok(())
    }

    pub fn price(&self) -> i64 {
        self.spec.price
    }
}
