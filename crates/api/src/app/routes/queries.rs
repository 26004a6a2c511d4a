use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use dealership_core::CarId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/buyers-for-car", get(buyers_for_car))
        .route("/buyers-by-model", get(buyers_by_model))
        .route("/cars-low-mileage", get(cars_low_mileage))
        .route("/new-cars", get(new_cars))
        .route("/most-expensive-car", get(most_expensive_car))
        .route("/market-analysis", get(market_analysis))
}

/// `?car_id=` matches a listed car; otherwise the car is described by
/// brand, model, year, transmission, condition, price and optional power.
pub async fn buyers_for_car(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::BuyersForCarQuery>,
) -> axum::response::Response {
    let result = match query.car_id.as_deref() {
        Some(raw) => {
            let car_id: CarId = match errors::parse_id(raw, "car") {
                Ok(v) => v,
                Err(res) => return res,
            };
            services.marketplace.buyers_for_car(car_id).await
        }
        None => {
            let profile = match query.into_profile() {
                Ok(p) => p,
                Err(msg) => {
                    return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg);
                }
            };
            services.marketplace.buyers_for_profile(&profile).await
        }
    };
    match result {
        Ok(buyers) => {
            let items = buyers.iter().map(dto::buyer_match_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn buyers_by_model(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ModelQuery>,
) -> axum::response::Response {
    match services.marketplace.buyers_by_model(&query.model).await {
        Ok(buyers) => {
            let items = buyers.iter().map(dto::buyer_by_model_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn cars_low_mileage(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.marketplace.low_mileage_cars().await {
        Ok(cars) => {
            let items = cars.iter().map(dto::low_mileage_car_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn new_cars(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.marketplace.new_cars().await {
        Ok(cars) => {
            let items = cars.iter().map(dto::listed_car_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn most_expensive_car(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.marketplace.most_expensive_car().await {
        Ok(details) => (StatusCode::OK, Json(dto::car_details_to_json(&details))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn market_analysis(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.marketplace.market_analysis().await {
        Ok(analysis) => (StatusCode::OK, Json(dto::market_analysis_to_json(&analysis))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
