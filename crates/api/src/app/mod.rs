//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and workflow/resolver wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON response mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use dealership_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services))
}

/// Router over already wired services.
///
/// Every request passes the auth middleware; handlers that need a caller take
/// a [`crate::context::PrincipalContext`] argument.
pub fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services.clone()))
                .layer(axum::middleware::from_fn_with_state(
                    services,
                    middleware::auth_middleware,
                )),
        )
}
