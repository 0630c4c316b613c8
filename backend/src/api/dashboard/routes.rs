//! Defines the HTTP route for the dashboard snapshot.

use crate::api::dashboard::handlers::dashboard;
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn dashboard_router() -> Router {
    Router::new()
        .route("/", get(dashboard))
        .layer(middleware::from_fn(jwt_auth))
}
