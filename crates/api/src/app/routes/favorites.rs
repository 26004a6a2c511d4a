use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use dealership_core::CarId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_favorites))
        .route("/:car_id", post(add_favorite).delete(remove_favorite))
}

pub async fn add_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(car_id): Path<String>,
) -> axum::response::Response {
    let car_id: CarId = match errors::parse_id(&car_id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.marketplace.add_favorite(principal.principal(), car_id).await {
        Ok(favorite) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": favorite.id.to_string(), "message": "added to favorites" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(car_id): Path<String>,
) -> axum::response::Response {
    let car_id: CarId = match errors::parse_id(&car_id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.marketplace.remove_favorite(principal.principal(), car_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "removed from favorites" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_favorites(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    match services.marketplace.favorites(principal.principal()).await {
        Ok(favorites) => {
            let items = favorites
                .iter()
                .map(|(fav, car)| dto::favorite_to_json(fav, car))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
