use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use dealership_catalog::NewStore;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_stores).post(create_store))
}

pub async fn create_store(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Json(body): Json<NewStore>,
) -> axum::response::Response {
    match services.marketplace.create_store(principal.principal(), body).await {
        Ok(store) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": store.id.to_string(), "message": "store created" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_stores(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.marketplace.stores().await {
        Ok(stores) => {
            let items = stores
                .iter()
                .map(|(store, count)| dto::store_to_json(store, *count))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
