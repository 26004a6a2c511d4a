use std::collections::HashMap;

use dealership_catalog::{Car, CarFilter, Condition};
use dealership_core::{CarId, SellerId};
use dealership_parties::{Buyer, CarProfile};

use crate::error::{ServiceError, ServiceResult};

use super::{CarDetails, Marketplace};

/// Mileage below which a car counts as low-mileage.
pub const LOW_MILEAGE_CEILING: i32 = 30_000;

/// A car together with its seller's display name.
#[derive(Debug, Clone)]
pub struct ListedCar {
    pub car: Car,
    pub seller_name: Option<String>,
}

/// Aggregate buyer budgets against listed car value.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketAnalysis {
    pub total_buying_power: i64,
    pub total_car_value: i64,
    /// `total_buying_power / total_car_value`, zero when nothing is listed.
    pub ratio: f64,
    pub average_buyer_budget: f64,
    pub average_car_price: f64,
    /// Buyers that stated a budget.
    pub buyers_count: usize,
    pub cars_count: usize,
}

impl MarketAnalysis {
    pub fn from_figures(budgets: &[i64], prices: &[i64]) -> Self {
        let total_buying_power: i64 = budgets.iter().sum();
        let total_car_value: i64 = prices.iter().sum();
        Self {
            total_buying_power,
            total_car_value,
            ratio: ratio(total_buying_power, total_car_value as f64),
            average_buyer_budget: ratio(total_buying_power, budgets.len() as f64),
            average_car_price: ratio(total_car_value, prices.len() as f64),
            buyers_count: budgets.len(),
            cars_count: prices.len(),
        }
    }
}

fn ratio(numerator: i64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator as f64 / denominator
    } else {
        0.0
    }
}

impl Marketplace {
    /// Buyers whose every stated preference accepts the listed car.
    pub async fn buyers_for_car(&self, car_id: CarId) -> ServiceResult<Vec<Buyer>> {
        let car = self.car(car_id).await?;
        self.buyers_for_profile(&CarProfile::from(&car.spec)).await
    }

    /// Buyers whose every stated preference accepts a described car.
    pub async fn buyers_for_profile(&self, profile: &CarProfile) -> ServiceResult<Vec<Buyer>> {
        let buyers = self.store.list_buyers().await?;
        Ok(buyers
            .into_iter()
            .filter(|b| b.preferences.accepts_profile(profile))
            .collect())
    }

    /// Buyers who named `model` as their preferred model.
    pub async fn buyers_by_model(&self, model: &str) -> ServiceResult<Vec<Buyer>> {
        let buyers = self.store.list_buyers().await?;
        Ok(buyers
            .into_iter()
            .filter(|b| b.preferences.wants_model(model))
            .collect())
    }

    pub async fn low_mileage_cars(&self) -> ServiceResult<Vec<Car>> {
        let filter = CarFilter::mileage_below(LOW_MILEAGE_CEILING);
        Ok(self.store.search_cars(&filter).await?)
    }

    pub async fn new_cars(&self) -> ServiceResult<Vec<ListedCar>> {
        let cars = self
            .store
            .search_cars(&CarFilter::in_condition(Condition::New))
            .await?;

        let mut names: HashMap<SellerId, Option<String>> = HashMap::new();
        let mut listed = Vec::with_capacity(cars.len());
        for car in cars {
            let seller_name = match names.get(&car.seller_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.store.seller(car.seller_id).await?.map(|s| s.full_name);
                    names.insert(car.seller_id, name.clone());
                    name
                }
            };
            listed.push(ListedCar { car, seller_name });
        }
        Ok(listed)
    }

    /// `NotFound` when nothing is listed.
    pub async fn most_expensive_car(&self) -> ServiceResult<CarDetails> {
        let car = self
            .store
            .most_expensive_car()
            .await?
            .ok_or_else(|| ServiceError::not_found("car"))?;
        self.car_details(car.id).await
    }

    pub async fn market_analysis(&self) -> ServiceResult<MarketAnalysis> {
        let budgets: Vec<i64> = self
            .store
            .list_buyers()
            .await?
            .iter()
            .filter_map(|b| b.preferences.max_price)
            .collect();
        let prices = self.store.car_prices().await?;
        Ok(MarketAnalysis::from_figures(&budgets, &prices))
    }
}
