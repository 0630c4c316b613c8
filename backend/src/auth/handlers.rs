//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for login and the MFA
//! flow, parse request data, and interact with the `auth::service` for core
//! business logic.

use crate::api::common::service_error_to_http;
use crate::auth::models::*;
use crate::auth::service::{AuthService, LoginOutcome};
use crate::config::Config;
use crate::services::user_service::UserService;
use crate::store::SharedStore;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(store): Extension<SharedStore>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<LoginResponse>, (StatusCode, String)> {
    let auth_service = match AuthService::new(store.as_ref(), &config) {
        Ok(service) => service,
        Err(error) => return Err(service_error_to_http(error)),
    };

    match auth_service.login(payload).await {
        Ok(LoginOutcome::Complete { token, user }) => Ok(ResponseJson(LoginResponse::complete(
            token,
            UserInfo::from(&user),
        ))),
        Ok(LoginOutcome::MfaRequired { mfa_token }) => {
            Ok(ResponseJson(LoginResponse::mfa_required(mfa_token)))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Exchange a pending-MFA token plus one-time code for a full session
#[axum::debug_handler]
pub async fn verify_mfa_login(
    Extension(store): Extension<SharedStore>,
    Extension(config): Extension<Config>,
    Json(payload): Json<MfaVerifyLoginRequest>,
) -> Result<ResponseJson<MfaVerifyLoginResponse>, (StatusCode, String)> {
    let auth_service = match AuthService::new(store.as_ref(), &config) {
        Ok(service) => service,
        Err(error) => return Err(service_error_to_http(error)),
    };

    match auth_service.verify_mfa_login(payload).await {
        Ok((token, user)) => Ok(ResponseJson(MfaVerifyLoginResponse {
            success: true,
            token,
            user: UserInfo::from(&user),
        })),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Begin MFA enrollment for the authenticated user
#[axum::debug_handler]
pub async fn mfa_setup(
    Extension(store): Extension<SharedStore>,
    Extension(config): Extension<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<MfaSetupResponse>, (StatusCode, String)> {
    let auth_service = match AuthService::new(store.as_ref(), &config) {
        Ok(service) => service,
        Err(error) => return Err(service_error_to_http(error)),
    };

    match auth_service.setup_mfa(&claims).await {
        Ok(enrollment) => Ok(ResponseJson(MfaSetupResponse {
            success: true,
            qr_code: enrollment.qr_code,
            secret: enrollment.secret,
        })),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Confirm MFA enrollment with a code from the authenticator app
#[axum::debug_handler]
pub async fn verify_mfa_setup(
    Extension(store): Extension<SharedStore>,
    Extension(config): Extension<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MfaConfirmSetupRequest>,
) -> Result<ResponseJson<MfaConfirmSetupResponse>, (StatusCode, String)> {
    let auth_service = match AuthService::new(store.as_ref(), &config) {
        Ok(service) => service,
        Err(error) => return Err(service_error_to_http(error)),
    };

    match auth_service.confirm_mfa_setup(&claims, &payload.token).await {
        Ok(()) => Ok(ResponseJson(MfaConfirmSetupResponse { success: true })),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request (client-side token invalidation)
#[axum::debug_handler]
pub async fn logout() -> Result<ResponseJson<serde_json::Value>, (StatusCode, String)> {
    // For JWT tokens, logout is handled on the client side by removing the
    // token from storage. The server can maintain a blacklist if we later
    // need enhanced security.
    Ok(ResponseJson(serde_json::json!({
        "message": "Logged out successfully"
    })))
}

/// Get current user information from token
#[axum::debug_handler]
pub async fn me(
    Extension(store): Extension<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<UserInfo>, (StatusCode, String)> {
    let user_service = UserService::new(store.as_ref());

    match user_service.get_user_required(&claims.sub).await {
        Ok(user) => Ok(ResponseJson(UserInfo::from(&user))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
