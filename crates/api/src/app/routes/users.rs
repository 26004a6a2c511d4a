use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/profile", get(profile))
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    match services.marketplace.profile(principal.principal()).await {
        Ok(profile) => (StatusCode::OK, Json(dto::profile_to_json(&profile))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
