use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use dealership_parties::{BuyerRegistration, SellerRegistration};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register/buyer", post(register_buyer))
        .route("/register/seller", post(register_seller))
        .route("/token", post(login))
}

pub async fn register_buyer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<BuyerRegistration>,
) -> axum::response::Response {
    match services.marketplace.register_buyer(body).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string(), "message": "buyer registered" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn register_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SellerRegistration>,
) -> axum::response::Response {
    match services.marketplace.register_seller(body).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string(), "message": "seller registered" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<dto::LoginForm>,
) -> axum::response::Response {
    match services.marketplace.login(&form.username, &form.password).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::token_to_json(&outcome))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
