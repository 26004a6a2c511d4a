//! Buyer purchase preferences and matching against listings.

use serde::{Deserialize, Serialize};

use dealership_catalog::{CarSpec, Condition, Transmission};
use dealership_core::{DomainError, DomainResult, ValueObject};

/// What a buyer is looking for. Every field is optional; an absent field
/// accepts any value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub preferred_brand: Option<String>,
    pub preferred_model: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_power: Option<i32>,
    pub max_power: Option<i32>,
    pub preferred_transmission: Option<Transmission>,
    pub preferred_condition: Option<Condition>,
    pub max_price: Option<i64>,
}

impl ValueObject for Preferences {}

impl Preferences {
    /// Blank strings are treated as "no preference".
    pub fn normalized(mut self) -> Self {
        self.preferred_brand = self.preferred_brand.filter(|s| !s.trim().is_empty());
        self.preferred_model = self.preferred_model.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let (Some(lo), Some(hi)) = (self.min_year, self.max_year) {
            if lo > hi {
                return Err(DomainError::validation("min_year must not exceed max_year"));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_power, self.max_power) {
            if lo > hi {
                return Err(DomainError::validation("min_power must not exceed max_power"));
            }
        }
        if self.max_price.is_some_and(|p| p <= 0) {
            return Err(DomainError::validation("max_price must be positive"));
        }
        Ok(())
    }

    /// Whether a listed car falls inside every stated preference.
    pub fn accepts(&self, car: &CarSpec) -> bool {
        self.accepts_profile(&CarProfile::from(car))
    }

    /// Brand and model compare case-insensitively. Power bounds are skipped
    /// when the profile carries no power.
    pub fn accepts_profile(&self, car: &CarProfile) -> bool {
        eq_ci(self.preferred_brand.as_deref(), &car.brand)
            && eq_ci(self.preferred_model.as_deref(), &car.model)
            && self.min_year.is_none_or(|y| car.year >= y)
            && self.max_year.is_none_or(|y| car.year <= y)
            && self.min_power.is_none_or(|p| car.power.is_none_or(|v| v >= p))
            && self.max_power.is_none_or(|p| car.power.is_none_or(|v| v <= p))
            && self.preferred_transmission.is_none_or(|t| car.transmission == t)
            && self.preferred_condition.is_none_or(|c| car.condition == c)
            && self.max_price.is_none_or(|p| car.price <= p)
    }

    /// A stated model preference equal to `model`, ignoring case.
    pub fn wants_model(&self, model: &str) -> bool {
        self.preferred_model
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(model.trim()))
    }

    /// `"<min>-<max>"`, with `any` for an open end.
    pub fn year_range(&self) -> String {
        let bound = |y: Option<i32>| y.map_or_else(|| "any".to_string(), |y| y.to_string());
        format!("{}-{}", bound(self.min_year), bound(self.max_year))
    }
}

/// The attributes buyer preferences are stated against. Describes a car
/// that need not be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarProfile {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub power: Option<i32>,
    pub transmission: Transmission,
    pub condition: Condition,
    pub price: i64,
}

impl From<&CarSpec> for CarProfile {
    fn from(spec: &CarSpec) -> Self {
        Self {
            brand: spec.brand.clone(),
            model: spec.model.clone(),
            year: spec.year,
            power: Some(spec.power),
            transmission: spec.transmission,
            condition: spec.condition,
            price: spec.price,
        }
    }
}

fn eq_ci(wanted: Option<&str>, actual: &str) -> bool {
    wanted.is_none_or(|w| w.eq_ignore_ascii_case(actual))
}
