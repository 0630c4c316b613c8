//! Defines the HTTP routes for scan submission.

use crate::api::scan::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::post};

/// Creates the scan router. Every route requires a full session.
pub fn scan_router() -> Router {
    Router::new()
        .route("/scan", post(run_scan))
        .route("/ai-review", post(ai_review))
        .layer(middleware::from_fn(jwt_auth))
}
