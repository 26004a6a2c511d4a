use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use dealership_auth::Principal;
use dealership_core::{CarId, DealId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_deal))
        .route("/my", get(my_deals))
        .route("/:id/status", put(set_deal_status))
}

pub async fn create_deal(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Query(query): Query<dto::CarIdQuery>,
) -> axum::response::Response {
    let car_id: CarId = match errors::parse_id(&query.car_id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.marketplace.create_deal(principal.principal(), car_id).await {
        Ok(deal) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "deal_id": deal.id.to_string(),
                "status": deal.status.as_str(),
                "price": deal.price,
                "message": "deal created",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn my_deals(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    let for_seller = matches!(principal.principal(), Principal::Seller(_));
    match services.marketplace.my_deals(principal.principal()).await {
        Ok(listings) => {
            let items = listings
                .iter()
                .map(|l| dto::deal_listing_to_json(l, for_seller))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_deal_status(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    Query(query): Query<dto::StatusQuery>,
) -> axum::response::Response {
    let id: DealId = match errors::parse_id(&id, "deal") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services
        .marketplace
        .set_deal_status(principal.principal(), id, &query.status)
        .await
    {
        Ok(deal) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": deal.id.to_string(),
                "status": deal.status.as_str(),
                "message": format!("deal status set to {}", deal.status),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
