use serde::Deserialize;
use serde_json::{Value, json};

use dealership_catalog::{Car, CarSpec, Condition, Favorite, Store, Transmission};
use dealership_infra::{
    CarDetails, DealListing, ListedCar, LoginOutcome, MarketAnalysis, Profile,
};
use dealership_parties::{Buyer, CarProfile};
use dealership_sales::Question;

// -------------------------
// Request DTOs
// -------------------------

/// OAuth2 password-flow form; `username` is the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CarRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(flatten)]
    pub spec: CarSpec,
}

#[derive(Debug, Deserialize)]
pub struct CarIdQuery {
    pub car_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AskQuestionQuery {
    pub car_id: String,
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerQuery {
    pub answer: String,
}

/// Either a listed `car_id`, or a described car.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuyersForCarQuery {
    pub car_id: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub power: Option<i32>,
    pub transmission: Option<Transmission>,
    pub condition: Option<Condition>,
    pub price: Option<i64>,
}

impl BuyersForCarQuery {
    /// The described car, or the names of the missing fields.
    pub fn into_profile(self) -> Result<CarProfile, String> {
        let mut missing = Vec::new();
        if self.brand.is_none() {
            missing.push("brand");
        }
        if self.model.is_none() {
            missing.push("model");
        }
        if self.year.is_none() {
            missing.push("year");
        }
        if self.transmission.is_none() {
            missing.push("transmission");
        }
        if self.condition.is_none() {
            missing.push("condition");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        match (self.brand, self.model, self.year, self.transmission, self.condition, self.price) {
            (Some(brand), Some(model), Some(year), Some(transmission), Some(condition), Some(price)) => {
                Ok(CarProfile {
                    brand,
                    model,
                    year,
                    power: self.power,
                    transmission,
                    condition,
                    price,
                })
            }
            _ => Err(format!("car_id or {} required", missing.join(", "))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    pub model: String,
}

// -------------------------
// Response mapping
// -------------------------

pub fn token_to_json(outcome: &LoginOutcome) -> Value {
    json!({
        "access_token": outcome.access_token,
        "token_type": "bearer",
        "role": outcome.role.as_str(),
        "expires_at": outcome.expires_at.to_rfc3339(),
    })
}

pub fn profile_to_json(profile: &Profile) -> Value {
    match profile {
        Profile::Buyer(buyer) => json!({
            "id": buyer.id.to_string(),
            "email": buyer.email,
            "full_name": buyer.full_name,
            "contact_info": buyer.contact_info,
            "role": "buyer",
            "preferences": buyer.preferences,
        }),
        Profile::Seller {
            seller,
            role,
            cars_count,
        } => json!({
            "id": seller.id.to_string(),
            "email": seller.email,
            "full_name": seller.full_name,
            "contact_info": seller.contact_info,
            "role": role.as_str(),
            "cars_count": cars_count,
        }),
    }
}

pub fn car_to_json(car: &Car) -> Value {
    let spec = &car.spec;
    json!({
        "id": car.id.to_string(),
        "seller_id": car.seller_id.to_string(),
        "store_id": car.store_id.map(|id| id.to_string()),
        "brand": spec.brand,
        "model": spec.model,
        "year": spec.year,
        "power": spec.power,
        "transmission": spec.transmission.as_str(),
        "condition": spec.condition.as_str(),
        "mileage": spec.mileage,
        "price": spec.price,
        "features": spec.features,
        "status": car.status.as_str(),
        "created_at": car.created_at.to_rfc3339(),
    })
}

pub fn car_details_to_json(details: &CarDetails) -> Value {
    let mut body = car_to_json(&details.car);
    body["seller"] = details
        .seller
        .as_ref()
        .map(|s| json!({ "name": s.full_name, "contact_info": s.contact_info }))
        .unwrap_or(Value::Null);
    body["store"] = details
        .store
        .as_ref()
        .map(|s| json!({ "name": s.name, "address": s.address }))
        .unwrap_or(Value::Null);
    body
}

pub fn store_to_json(store: &Store, cars_count: i64) -> Value {
    json!({
        "id": store.id.to_string(),
        "name": store.name,
        "address": store.address,
        "cars_count": cars_count,
    })
}

pub fn favorite_to_json(favorite: &Favorite, car: &Car) -> Value {
    let mut body = car_to_json(car);
    body["favorite_id"] = json!(favorite.id.to_string());
    body["added_at"] = json!(favorite.added_at.to_rfc3339());
    body
}

/// Buyers see who sells; sellers see who is buying.
pub fn deal_listing_to_json(listing: &DealListing, for_seller: bool) -> Value {
    let deal = &listing.deal;
    let mut body = json!({
        "id": deal.id.to_string(),
        "car": {
            "id": listing.car.id.to_string(),
            "brand": listing.car.brand,
            "model": listing.car.model,
            "year": listing.car.year,
        },
        "price": deal.price,
        "status": deal.status.as_str(),
        "deal_date": deal.deal_date.to_rfc3339(),
    });
    if for_seller {
        body["buyer"] = json!({
            "name": listing.buyer_name,
            "contact": listing.buyer_contact,
        });
    } else {
        body["seller_name"] = json!(listing.seller_name);
    }
    body
}

pub fn question_to_json(question: &Question) -> Value {
    json!({
        "id": question.id.to_string(),
        "car_id": question.car_id.to_string(),
        "buyer_id": question.buyer_id.to_string(),
        "question": question.question,
        "answer": question.answer,
        "created_at": question.created_at.to_rfc3339(),
    })
}

pub fn buyer_match_to_json(buyer: &Buyer) -> Value {
    json!({
        "id": buyer.id.to_string(),
        "full_name": buyer.full_name,
        "contact_info": buyer.contact_info,
        "max_price": buyer.preferences.max_price,
    })
}

pub fn buyer_by_model_to_json(buyer: &Buyer) -> Value {
    let prefs = &buyer.preferences;
    json!({
        "id": buyer.id.to_string(),
        "full_name": buyer.full_name,
        "contact_info": buyer.contact_info,
        "preferences": {
            "brand": prefs.preferred_brand,
            "year_range": prefs.year_range(),
            "max_price": prefs.max_price,
        },
    })
}

pub fn low_mileage_car_to_json(car: &Car) -> Value {
    let spec = &car.spec;
    json!({
        "id": car.id.to_string(),
        "brand": spec.brand,
        "model": spec.model,
        "year": spec.year,
        "mileage": spec.mileage,
        "price": spec.price,
        "condition": spec.condition.as_str(),
    })
}

pub fn listed_car_to_json(listed: &ListedCar) -> Value {
    let spec = &listed.car.spec;
    json!({
        "id": listed.car.id.to_string(),
        "brand": spec.brand,
        "model": spec.model,
        "year": spec.year,
        "power": spec.power,
        "transmission": spec.transmission.as_str(),
        "price": spec.price,
        "seller_name": listed.seller_name,
    })
}

pub fn market_analysis_to_json(analysis: &MarketAnalysis) -> Value {
    json!({
        "total_buying_power": analysis.total_buying_power,
        "total_car_value": analysis.total_car_value,
        "ratio": analysis.ratio,
        "average_buyer_budget": analysis.average_buyer_budget,
        "average_car_price": analysis.average_car_price,
        "buyers_count": analysis.buyers_count,
        "cars_count": analysis.cars_count,
    })
}
