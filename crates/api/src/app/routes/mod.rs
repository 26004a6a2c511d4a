use axum::Router;

pub mod auth;
pub mod cars;
pub mod deals;
pub mod favorites;
pub mod queries;
pub mod questions;
pub mod stores;
pub mod system;
pub mod users;

/// Router for every resource endpoint. Public and protected handlers share
/// paths; protection is per handler.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/cars", cars::router())
        .nest("/favorites", favorites::router())
        .nest("/deals", deals::router())
        .nest("/questions", questions::router())
        .nest("/stores", stores::router())
        .nest("/queries", queries::router())
}
