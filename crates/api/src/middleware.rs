use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// Resolves the bearer token, when one is sent, into a [`PrincipalContext`].
///
/// Requests without an `Authorization` header pass through untouched so public
/// routes keep working; protected handlers reject them through the extractor.
/// A header that is present but unusable is rejected here.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !req.headers().contains_key(header::AUTHORIZATION) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(_) => return errors::unauthenticated("expected a bearer token"),
    };

    let principal = match services.resolver.resolve(token).await {
        Ok(principal) => principal,
        Err(e) if e.is_unauthenticated() => {
            tracing::debug!(error = %e, "bearer token rejected");
            return errors::unauthenticated("could not validate credentials");
        }
        Err(e) => {
            tracing::error!(error = %e, "principal lookup failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "principal lookup failed",
            );
        }
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
