//! Public listing search.

use serde::Deserialize;

use crate::{Car, Condition, Transmission};

/// Page size when the caller gives none.
pub const DEFAULT_LIMIT: usize = 100;

/// Conjunctive search over listings. Text filters are case-insensitive
/// substring matches; numeric bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CarFilter {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub condition: Option<Condition>,
    pub transmission: Option<Transmission>,
    pub max_mileage: Option<i32>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl CarFilter {
    pub fn skip(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// `(offset, limit)` as SQL bind values, saturating at `i64::MAX`.
    pub fn page_bounds(&self) -> (i64, i64) {
        let clamp = |v: usize| i64::try_from(v).unwrap_or(i64::MAX);
        (clamp(self.skip()), clamp(self.limit()))
    }

    /// All cars with mileage strictly below `ceiling`, unpaged.
    pub fn mileage_below(ceiling: i32) -> Self {
        Self {
            max_mileage: Some(ceiling.saturating_sub(1)),
            limit: Some(usize::MAX),
            ..Self::default()
        }
    }

    /// All cars in `condition`, unpaged.
    pub fn in_condition(condition: Condition) -> Self {
        Self {
            condition: Some(condition),
            limit: Some(usize::MAX),
            ..Self::default()
        }
    }

    pub fn matches(&self, car: &Car) -> bool {
        let spec = &car.spec;
        contains_ci(&spec.brand, self.brand.as_deref())
            && contains_ci(&spec.model, self.model.as_deref())
            && self.min_year.is_none_or(|y| spec.year >= y)
            && self.max_year.is_none_or(|y| spec.year <= y)
            && self.min_price.is_none_or(|p| spec.price >= p)
            && self.max_price.is_none_or(|p| spec.price <= p)
            && self.condition.is_none_or(|c| spec.condition == c)
            && self.transmission.is_none_or(|t| spec.transmission == t)
            && self.max_mileage.is_none_or(|m| spec.mileage <= m)
    }

    /// Filter, then page. Input order is preserved.
    pub fn apply<'a, I>(&self, cars: I) -> Vec<Car>
    where
        I: IntoIterator<Item = &'a Car>,
    {
        cars.into_iter()
            .filter(|c| self.matches(c))
            .skip(self.skip())
            .take(self.limit())
            .cloned()
            .collect()
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}
