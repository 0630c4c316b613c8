//! Defines the HTTP routes for admin tooling.

use crate::api::admin::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// Creates the admin router. Every route requires a full session; per-route
/// role requirements are enforced in the handlers.
pub fn admin_router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route("/users/assign-role", post(assign_role))
        .route("/audit-logs", get(audit_logs))
        .layer(middleware::from_fn(jwt_auth))
}
