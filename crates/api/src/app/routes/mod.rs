use axum::Router;

pub mod common;
pub mod loans;
pub mod system;
pub mod users;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/loans", loans::router())
}
