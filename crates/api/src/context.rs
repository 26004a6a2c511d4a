use async_trait::async_trait;
use axum::{http::request::Parts, extract::FromRequestParts, response::Response};

use dealership_auth::Principal;

use crate::app::errors;

/// Principal context for a request (the resolved buyer or seller).
///
/// Inserted by [`crate::middleware::auth_middleware`] when a bearer token is
/// present and valid. Handlers that take it as an argument reject the request
/// with 401 when it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PrincipalContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PrincipalContext>()
            .cloned()
            .ok_or_else(|| errors::unauthenticated("not authenticated"))
    }
}
