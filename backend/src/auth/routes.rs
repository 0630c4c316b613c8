//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle login, the MFA flow, and session introspection.
//! They are designed to be integrated into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/mfa/verify-login", post(verify_mfa_login))
        .route("/logout", post(logout))
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
        .route(
            "/mfa/setup",
            post(mfa_setup).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/mfa/verify-setup",
            post(verify_mfa_setup).layer(middleware::from_fn(jwt_auth)),
        )
}
