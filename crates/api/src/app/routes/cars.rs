use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use dealership_catalog::CarFilter;
use dealership_core::{CarId, StoreId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(search_cars).post(create_car))
        .route("/mine", get(my_cars))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
        .route("/:id/status", put(set_car_status))
}

pub async fn search_cars(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filter): Query<CarFilter>,
) -> axum::response::Response {
    match services.marketplace.search_cars(&filter).await {
        Ok(cars) => {
            let items = cars.iter().map(dto::car_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_car(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CarId = match errors::parse_id(&id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.marketplace.car_details(id).await {
        Ok(details) => (StatusCode::OK, Json(dto::car_details_to_json(&details))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn my_cars(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    match services.marketplace.my_cars(principal.principal()).await {
        Ok(cars) => {
            let items = cars.iter().map(dto::car_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_car(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Json(body): Json<dto::CarRequest>,
) -> axum::response::Response {
    let store_id = match parse_store_id(body.store_id.as_deref()) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services
        .marketplace
        .create_car(principal.principal(), store_id, body.spec)
        .await
    {
        Ok(car) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": car.id.to_string(), "message": "car listed" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_car(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    Json(body): Json<dto::CarRequest>,
) -> axum::response::Response {
    let id: CarId = match errors::parse_id(&id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    let store_id = match parse_store_id(body.store_id.as_deref()) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services
        .marketplace
        .update_car(principal.principal(), id, store_id, body.spec)
        .await
    {
        Ok(car) => (StatusCode::OK, Json(dto::car_to_json(&car))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_car_status(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    Query(query): Query<dto::StatusQuery>,
) -> axum::response::Response {
    let id: CarId = match errors::parse_id(&id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services
        .marketplace
        .set_car_status(principal.principal(), id, &query.status)
        .await
    {
        Ok(car) => (StatusCode::OK, Json(dto::car_to_json(&car))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_car(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CarId = match errors::parse_id(&id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.marketplace.delete_car(principal.principal(), id).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "message": "car deleted" }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_store_id(raw: Option<&str>) -> Result<Option<StoreId>, axum::response::Response> {
    raw.map(|s| errors::parse_id(s, "store")).transpose()
}
